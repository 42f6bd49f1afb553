pub struct LevelMeter {
    epsilon: f32,
}

impl LevelMeter {
    pub fn new() -> Self {
        Self { epsilon: 1e-10 }
    }

    /// Root-mean-square energy of a frame of normalized samples.
    ///
    /// Callers are expected to reject empty frames at the boundary; an empty
    /// slice reads as pure silence here rather than a panic.
    pub fn rms(&self, samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }

        let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        let mean_square = sum_squares / samples.len() as f64;
        mean_square.sqrt() as f32
    }

    pub fn rms_to_dbfs(&self, rms: f32) -> f32 {
        if rms <= self.epsilon {
            return -100.0;
        }
        20.0 * rms.log10()
    }

    pub fn dbfs(&self, samples: &[f32]) -> f32 {
        let rms = self.rms(samples);
        self.rms_to_dbfs(rms)
    }
}

impl Default for LevelMeter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_LEN: usize = 320;

    #[test]
    fn silence_reads_as_zero_rms_and_low_dbfs() {
        let meter = LevelMeter::new();
        let silence = vec![0.0f32; FRAME_LEN];
        assert_eq!(meter.rms(&silence), 0.0);
        assert!(meter.dbfs(&silence) <= -100.0);
    }

    #[test]
    fn full_scale_reads_as_zero_dbfs() {
        let meter = LevelMeter::new();
        let full_scale = vec![1.0f32; FRAME_LEN];
        let db = meter.dbfs(&full_scale);
        assert!((db - 0.0).abs() < 0.1);
    }

    #[test]
    fn sine_rms_matches_expected_value() {
        let meter = LevelMeter::new();
        let sine: Vec<f32> = (0..FRAME_LEN)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * i as f32 / FRAME_LEN as f32;
                phase.sin() * 0.5
            })
            .collect();

        // 0.5 amplitude sine has RMS 0.5 / sqrt(2) ~= 0.354
        let rms = meter.rms(&sine);
        assert!((rms - 0.354).abs() < 0.01);
    }
}
