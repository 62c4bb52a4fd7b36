/// How a computed channel value is written back into 8-bit storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Quantize {
    /// Drop the fractional part
    #[default]
    Truncate,
    /// Nearest integer, ties to even (HTML canvas `Uint8ClampedArray`)
    RoundHalfEven,
}

impl Quantize {
    /// Store `value` as a channel byte, clamping to [0, 255]
    pub fn store(self, value: f64) -> u8 {
        let clamped = value.clamp(0.0, 255.0);
        match self {
            Quantize::Truncate => clamped.trunc() as u8,
            Quantize::RoundHalfEven => clamped.round_ties_even() as u8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quantize::Truncate => "truncate",
            Quantize::RoundHalfEven => "round-half-even",
        }
    }
}
