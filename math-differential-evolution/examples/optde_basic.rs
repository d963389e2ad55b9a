use math_carto_differential_evolution::{
    AdaptiveControl, CallbackAction, DEConfigBuilder, DEIntermediate, Strategy, minimize,
};
use math_carto_test_functions::{get_function_metadata, residual_function};
use ndarray::Array1;
use std::convert::Infallible;

/// Runs every mutation strategy on the benchmark table and prints one line per run.
fn main() {
    env_logger::init();

    let metadata = get_function_metadata();
    let mut names: Vec<&String> = metadata.keys().collect();
    names.sort();

    for name in names {
        let meta = &metadata[name];
        let Some(f) = residual_function(name) else {
            continue;
        };
        let functor = |x: &Array1<f64>| Ok::<_, Infallible>(f(x));
        let lower = Array1::from_iter(meta.bounds.iter().map(|b| b.0));
        let upper = Array1::from_iter(meta.bounds.iter().map(|b| b.1));

        println!("{name}: {}", meta.description);
        for strategy in Strategy::ALL {
            let config = DEConfigBuilder::new()
                .population(30)
                .epsilon(1e-10)
                .max_generations(2000)
                .strategy(strategy)
                .control(AdaptiveControl::Jitter)
                .seed(42)
                .callback(Box::new(|inter: &DEIntermediate| {
                    if inter.iter % 500 == 0 {
                        log::info!("generation {} f={:.3e}", inter.iter, inter.fun);
                    }
                    CallbackAction::Continue
                }))
                .build();
            let config = match config {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("  {strategy:?}: {e}");
                    continue;
                }
            };
            match minimize(&functor, lower.clone(), upper.clone(), None, config) {
                Ok(report) => println!(
                    "  {:<16} f={:.3e} nit={:<5} nfev={:<6} {:?}",
                    format!("{strategy:?}"),
                    report.fun,
                    report.nit,
                    report.nfev,
                    report.termination
                ),
                Err(e) => eprintln!("  {strategy:?}: {e}"),
            }
        }
    }
}
