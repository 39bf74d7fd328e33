//! Rational resampling example.
//!
//! Converts a 48 kHz tone to 44.1 kHz in one shot and then streams the same
//! conversion through a reusable resampler.

use dspfft::{resample, FirResampler, Resampler};

fn main() {
    let fs_in = 48_000usize;
    let fs_out = 44_100usize;
    let tone: Vec<f64> = (0..4800)
        .map(|i| (2.0 * core::f64::consts::PI * 1000.0 * i as f64 / fs_in as f64).sin())
        .collect();

    let once = resample(&tone, fs_out, fs_in).unwrap();
    println!("one-shot: {} -> {} samples", tone.len(), once.len());

    let mut rs = FirResampler::<f64>::new(fs_out, fs_in).unwrap();
    println!(
        "mode={:?} L={} M={} delay={}",
        rs.mode(),
        rs.interp_rate(),
        rs.decim_rate(),
        rs.delay()
    );
    let chunk = rs.next_size(1000);
    let mut streamed = Vec::new();
    for part in tone.chunks(chunk) {
        if part.len() % rs.decim_rate() != 0 {
            break;
        }
        streamed.extend(rs.process(part).unwrap());
    }
    println!("streamed {} samples in chunks of {chunk}", streamed.len());
}
