use crate::frame::AudioFrame;

/// Linear-interpolation rate conversion.
///
/// Deliberately low quality: O(n), allocation-free on the identity path, and
/// dependency-free. The outbound chunks feed a speech model, not a listener,
/// so interpolation artifacts are an acceptable trade for simplicity.
pub fn resample(frame: AudioFrame, target_rate: u32) -> AudioFrame {
    if frame.sample_rate == target_rate {
        return frame;
    }

    let ratio = frame.sample_rate as f64 / target_rate as f64;
    let out_len = (frame.samples.len() as f64 / ratio).floor() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let lower = pos.floor() as usize;
        let frac = (pos - pos.floor()) as f32;

        // Past the end, hold the last sample rather than interpolate into
        // nothing; fully out of range reads as silence.
        let a = frame.samples.get(lower).copied().unwrap_or(0.0);
        let b = frame.samples.get(lower + 1).copied().unwrap_or(a);
        out.push(a + (b - a) * frac);
    }

    AudioFrame::new(out, target_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_when_rates_match() {
        let frame = AudioFrame::new(vec![0.1, -0.2, 0.3, -0.4], 16_000);
        let out = resample(frame.clone(), 16_000);
        assert_eq!(out, frame);
    }

    #[test]
    fn downsample_halves_the_length() {
        let frame = AudioFrame::new(vec![0.0; 320], 32_000);
        let out = resample(frame, 16_000);
        assert_eq!(out.len(), 160);
        assert_eq!(out.sample_rate, 16_000);
    }

    #[test]
    fn upsample_doubles_the_length() {
        let frame = AudioFrame::new(vec![0.0; 160], 16_000);
        let out = resample(frame, 32_000);
        assert_eq!(out.len(), 320);
    }

    #[test]
    fn upsample_interpolates_between_neighbors() {
        let frame = AudioFrame::new(vec![0.0, 1.0], 16_000);
        let out = resample(frame, 32_000);
        // Positions 0.0, 0.5, 1.0, 1.5 -> 0.0, 0.5, 1.0, then hold.
        assert_eq!(out.samples.len(), 4);
        assert!((out.samples[0] - 0.0).abs() < 1e-6);
        assert!((out.samples[1] - 0.5).abs() < 1e-6);
        assert!((out.samples[2] - 1.0).abs() < 1e-6);
        assert!((out.samples[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn downsample_picks_interpolated_points() {
        let frame = AudioFrame::new(vec![0.0, 0.25, 0.5, 0.75], 32_000);
        let out = resample(frame, 16_000);
        // ratio 2: positions 0 and 2 land exactly on input samples.
        assert_eq!(out.samples.len(), 2);
        assert!((out.samples[0] - 0.0).abs() < 1e-6);
        assert!((out.samples[1] - 0.5).abs() < 1e-6);
    }
}
