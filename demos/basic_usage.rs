//! Basic usage example for dspfft
//!
//! Walks through the thread-local transforms, an explicit planner, the
//! overlap-add filter and the channelizer.

use dspfft::subband::design_prototype;
use dspfft::{fft, ifft, irfft, rfft, Channelizer, Cmplx, FftPlanner, RealFftFilter, Real};

fn fmt(v: &[Cmplx]) -> Vec<String> {
    v.iter().map(|c| format!("{:.2}{:+.2}i", c.re, c.im)).collect()
}

fn main() {
    println!("=== dspfft Basic Usage Example ===\n");

    // 1. Thread-local FFT; plans are cached per size
    println!("1. Fast Fourier Transform (FFT)");
    let data: Vec<Cmplx> = [1.0, 2.0, 3.0, 4.0].iter().map(|&r| Cmplx::new(r, 0.0)).collect();
    let spectrum = fft(&data).unwrap();
    println!("   FFT: {:?}", fmt(&spectrum));
    let back = ifft(&spectrum).unwrap();
    println!("   IFFT: {:?}", back.iter().map(|c| c.re).collect::<Vec<_>>());
    println!();

    // 2. Any length works; 45 runs mixed-radix and 97 a prime engine
    println!("2. Arbitrary lengths");
    let mut planner = FftPlanner::<Real>::new();
    for n in [45usize, 97, 1000] {
        let plan = planner.plan_fft(n).unwrap();
        println!("   n={n}: {:?}", plan.kind());
    }
    println!();

    // 3. Real FFT
    println!("3. Real FFT");
    let real_input: Vec<Real> = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    let real_spec = rfft(&real_input).unwrap();
    println!("   RFFT: {:?}", fmt(&real_spec[..real_input.len() / 2 + 1]));
    println!("   IRFFT: {:?}", irfft(&real_spec).unwrap());
    println!();

    // 4. Streaming FIR filter
    println!("4. Overlap-add filter");
    let mut filter = RealFftFilter::<Real>::new(&[0.25, 0.5, 0.25]).unwrap();
    let impulse: Vec<Real> = (0..8).map(|i| if i == 2 { 1.0 } else { 0.0 }).collect();
    println!("   block={} nfft={}", filter.block_len(), filter.fft_len());
    println!("   response: {:?}", filter.process(&impulse).unwrap());
    println!();

    // 5. Channelizer
    println!("5. Channelizer");
    let bands = 8;
    let proto = design_prototype::<Real>(bands, 8).unwrap();
    let mut bank = Channelizer::new(&proto, bands, bands).unwrap();
    let tone: Vec<Real> = (0..512)
        .map(|i| (2.0 * core::f64::consts::PI as Real * 2.0 / bands as Real * i as Real).cos())
        .collect();
    let mut energy = vec![0.0 as Real; bands];
    for frame in tone.chunks(bank.frame_len()) {
        for (e, v) in energy.iter_mut().zip(bank.process(frame).unwrap()) {
            *e += v.norm_sqr();
        }
    }
    println!("   band energy: {:?}", energy.iter().map(|e| format!("{e:.1}")).collect::<Vec<_>>());
}
