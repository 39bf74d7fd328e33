use dspfft::{Complex64, FftPlanner};

fn main() {
    // Planner-based real FFT; the inverse takes the packed half spectrum
    let mut planner = FftPlanner::<f64>::new();
    let input = vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    let spectrum = planner.rfft(&input).unwrap();
    let packed: Vec<Complex64> = spectrum[..input.len() / 2 + 1].to_vec();
    let output = planner.irfft(&packed, input.len()).unwrap();
    println!("Input: {:?}\nReconstructed: {:?}", input, output);

    // Explicit plans keep their own work buffers
    let mut fwd = planner.plan_rfft(12).unwrap();
    let mut inv = planner.plan_irfft(12).unwrap();
    let odd: Vec<f64> = (0..12).map(|i| (i as f64 * 0.5).cos()).collect();
    let full = fwd.process(&odd).unwrap();
    let back = inv.process(&full).unwrap();
    println!("Length 12 packed bins: {}\nRound trip: {:?}", inv.packed_len(), back);
}
