//! Derived visual indicators for the conflict score.
//!
//! Everything here is a pure function of the score and is recomputed on every
//! render; nothing is persisted.

/// Score at which the gauge switches to its alert style.
pub const ALERT_THRESHOLD: u8 = 90;

/// Number of samples in the pulse waveform.
pub const PULSE_SAMPLES: usize = 100;

/// Horizontal extent of the waveform.
pub const PULSE_X_MAX: f64 = 10.0;

/// Fixed vertical bounds of the waveform plot.
pub const PULSE_Y_BOUNDS: [f64; 2] = [-4.0, 4.0];

/// Coarse temperature band used to colour the gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeBand {
    /// 0 to 30.
    Calm,
    /// 31 to 60.
    Tense,
    /// Above 60.
    Heated,
}

/// Band for `score`.
pub fn gauge_band(score: u8) -> GaugeBand {
    match score {
        0..=30 => GaugeBand::Calm,
        31..=60 => GaugeBand::Tense,
        _ => GaugeBand::Heated,
    }
}

/// Whether the gauge should show the alert style.
pub fn is_alert(score: u8) -> bool {
    score >= ALERT_THRESHOLD
}

/// Frequency and amplitude of the pulse. Both grow with the score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseParams {
    /// Angular frequency, `1 + score / 20`.
    pub frequency: f64,
    /// Peak height, `1 + score / 50`.
    pub amplitude: f64,
}

/// Pulse parameters for `score`.
pub fn pulse_params(score: u8) -> PulseParams {
    let score = f64::from(score);
    PulseParams {
        frequency: 1.0 + score / 20.0,
        amplitude: 1.0 + score / 50.0,
    }
}

/// `amplitude * sin(frequency * x)` sampled evenly over `[0, PULSE_X_MAX]`.
pub fn pulse_wave(score: u8) -> Vec<(f64, f64)> {
    let params = pulse_params(score);
    let step = PULSE_X_MAX / (PULSE_SAMPLES - 1) as f64;
    (0..PULSE_SAMPLES)
        .map(|i| {
            let x = i as f64 * step;
            (x, params.amplitude * (params.frequency * x).sin())
        })
        .collect()
}
