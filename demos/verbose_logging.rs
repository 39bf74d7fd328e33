//! Demonstrates enabling verbose logging for dspfft.
use dspfft::{FftPlanner, RealFftFilter};

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .init();

    // capacity 2 so the third size evicts the first
    let mut planner = FftPlanner::<f64>::with_config(dspfft::config::PlannerConfig { plan_cache_size: 2 });
    for n in [48usize, 97, 256, 48] {
        let x = vec![dspfft::Complex64::one(); n];
        planner.fft(&x).unwrap();
    }

    let mut filter = RealFftFilter::with_planner(&[1.0, -1.0, 0.5], &mut planner).unwrap();
    filter.process(&[1.0, 2.0, 3.0, 4.0]).unwrap();
}
