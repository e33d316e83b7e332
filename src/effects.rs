use jackwrap_engine::{Control, Cycle, ProcessCallback};
use std::str::FromStr;

pub const EFFECT_ENV: &str = "JACKWRAP_EFFECT";

/// Processing installed by the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Effect {
    /// Copies the input to the output.
    #[default]
    Passthrough,
    /// `3 * x * x`, a crude nonlinear distortion.
    Distortion,
}

impl FromStr for Effect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passthrough" | "copy" => Ok(Self::Passthrough),
            "distortion" => Ok(Self::Distortion),
            other => anyhow::bail!("Unknown effect '{other}'"),
        }
    }
}

impl Effect {
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var(EFFECT_ENV) {
            Ok(value) => value.parse(),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn apply(self, input: &[f32], output: &mut [f32]) {
        match self {
            Self::Passthrough => {
                let n = input.len().min(output.len());
                output[..n].copy_from_slice(&input[..n]);
            }
            Self::Distortion => {
                for (out, &sample) in output.iter_mut().zip(input) {
                    *out = 3.0 * sample * sample;
                }
            }
        }
    }

    pub fn callback(self) -> impl ProcessCallback {
        move |cycle: &mut Cycle<'_>| {
            let (input, output) = cycle.buffers();
            self.apply(input, output);
            Control::Continue
        }
    }
}
