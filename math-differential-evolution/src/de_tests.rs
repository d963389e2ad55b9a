use crate::{
    AdaptiveControl, CallbackAction, DEConfigBuilder, DEError, DEIntermediate, DifferentialEvolution,
    FAILED_EVALUATION, Strategy, Termination, minimize,
};
use math_carto_matrix::Matrix;
use ndarray::{Array1, array};
use std::convert::Infallible;

fn sphere(x: &Array1<f64>) -> Result<Array1<f64>, Infallible> {
    Ok(x.clone())
}

#[cfg(test)]
mod strategy_tests {
    use super::*;

    /// Every strategy under every control mode, repeated over seeds.
    #[test]
    fn test_sphere_convergence_rate_all_strategies_and_modes() {
        let seeds = 8;
        for strategy in Strategy::ALL {
            for control in AdaptiveControl::ALL {
                let mut converged = 0;
                for seed in 0..seeds {
                    let config = DEConfigBuilder::new()
                        .population(20)
                        .epsilon(1e-8)
                        .max_generations(2000)
                        .f(0.6)
                        .cr(0.9)
                        .strategy(strategy)
                        .control(control)
                        .seed(1000 + seed)
                        .build()
                        .unwrap();
                    let report =
                        minimize(&sphere, array![-5.0, -5.0], array![5.0, 5.0], None, config)
                            .unwrap();
                    if report.fun < 1e-6 && report.x.iter().all(|v| v.abs() < 1e-3) {
                        converged += 1;
                    }
                }
                assert!(
                    converged >= 6,
                    "{strategy:?}/{control:?}: {converged}/{seeds} runs converged"
                );
            }
        }
    }

    #[test]
    fn test_sphere_scenario_dim2_pop10() {
        let mut converged = 0;
        for seed in 0..10 {
            let config = DEConfigBuilder::new()
                .population(10)
                .epsilon(1e-6)
                .max_generations(500)
                .f(0.5)
                .cr(0.9)
                .strategy(Strategy::Rand1)
                .seed(seed)
                .build()
                .unwrap();
            let report =
                minimize(&sphere, array![-10.0, -10.0], array![10.0, 10.0], None, config).unwrap();
            if report.nit < 500 && report.fun < 1e-6 {
                assert!(report.termination.is_success());
                assert!(report.success);
                converged += 1;
            }
        }
        assert!(converged >= 8, "{converged}/10 runs converged");
    }

    #[test]
    fn test_same_seed_same_result() {
        let run = || {
            let config = DEConfigBuilder::new()
                .population(12)
                .strategy(Strategy::RandToBest1)
                .control(AdaptiveControl::Sam)
                .max_generations(50)
                .seed(77)
                .build()
                .unwrap();
            minimize(&sphere, array![-3.0, -3.0, -3.0], array![3.0, 3.0, 3.0], None, config)
                .unwrap()
        };
        let a = run();
        let b = run();
        assert_eq!(a.x, b.x);
        assert_eq!(a.fun, b.fun);
        assert_eq!(a.nit, b.nit);
    }
}

#[cfg(test)]
mod benchmark_tests {
    use super::*;
    use math_carto_test_functions::{get_function_metadata, residual_function};

    #[test]
    fn test_benchmark_problems_reach_global_minimum() {
        let metadata = get_function_metadata();
        for name in ["booth", "beale", "rosenbrock", "himmelblau", "freudenstein_roth"] {
            let meta = &metadata[name];
            let f = residual_function(name).unwrap();
            let functor = |x: &Array1<f64>| Ok::<_, Infallible>(f(x));
            let lower = Array1::from_iter(meta.bounds.iter().map(|b| b.0));
            let upper = Array1::from_iter(meta.bounds.iter().map(|b| b.1));

            let mut hits = 0;
            for seed in 0..5 {
                let config = DEConfigBuilder::new()
                    .population(30)
                    .epsilon(1e-10)
                    .max_generations(3000)
                    .f(0.7)
                    .cr(0.9)
                    .strategy(Strategy::Rand1)
                    .control(AdaptiveControl::Jitter)
                    .seed(seed)
                    .build()
                    .unwrap();
                let report = minimize(&functor, lower.clone(), upper.clone(), None, config).unwrap();
                let near_minimum = meta.global_minima.iter().any(|(xm, _)| {
                    xm.iter()
                        .zip(report.x.iter())
                        .all(|(a, b)| (a - b).abs() < 1e-2)
                });
                if report.fun < 1e-6 && near_minimum {
                    hits += 1;
                }
            }
            assert!(hits >= 3, "{name}: {hits}/5 runs reached the global minimum");
        }
    }
}

#[cfg(test)]
mod crossover_tests {
    use crate::crossover_binomial::binomial_crossover;
    use ndarray::Array1;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_swap_fraction_approaches_cr() {
        let mut rng = StdRng::seed_from_u64(42);
        let dim = 8;
        let target = Array1::<f64>::zeros(dim);
        let mutant = Array1::<f64>::ones(dim);
        for cr in [0.1, 0.5, 0.9] {
            let trials = 20_000;
            let mut swapped = 0usize;
            for _ in 0..trials {
                swapped += binomial_crossover(target.view(), &mutant, cr, &mut rng).swapped;
            }
            let fraction = swapped as f64 / (trials * dim) as f64;
            assert!((fraction - cr).abs() < 0.01, "cr={cr}: fraction={fraction}");
        }
    }

    #[test]
    fn test_forced_swap_probability() {
        let mut rng = StdRng::seed_from_u64(7);
        let dim = 3;
        let cr = 0.3;
        let target = Array1::<f64>::zeros(dim);
        let mutant = Array1::<f64>::ones(dim);
        let trials = 40_000;
        let mut forced = 0usize;
        for _ in 0..trials {
            let outcome = binomial_crossover(target.view(), &mutant, cr, &mut rng);
            // trial always differs from the parent
            assert!(outcome.trial.sum() >= 1.0);
            if outcome.forced {
                assert_eq!(outcome.swapped, 0);
                assert_eq!(outcome.trial.sum(), 1.0);
                forced += 1;
            }
        }
        let expected = (1.0f64 - cr).powi(dim as i32);
        let rate = forced as f64 / trials as f64;
        assert!((rate - expected).abs() < 0.01, "rate={rate}, expected={expected}");
    }

    #[test]
    fn test_cr_one_copies_mutant() {
        let mut rng = StdRng::seed_from_u64(1);
        let target = Array1::<f64>::zeros(5);
        let mutant = Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let outcome = binomial_crossover(target.view(), &mutant, 1.0, &mut rng);
        assert_eq!(outcome.trial, mutant);
        assert!(!outcome.forced);
    }
}

#[cfg(test)]
mod mutation_tests {
    use crate::mutant_rand_to_dir1::mutant_rand_to_dir1;
    use crate::mutant_target_to_best1::mutant_target_to_best1;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_rand_to_dir_steps_away_from_worse() {
        // only individuals 1 and 2 can be drawn for target 0
        let pop = array![[0.0, 0.0], [1.0, 1.0], [3.0, 2.0]];
        let energies = array![0.0, 2.0, 13.0];
        let f = array![0.5, 0.5];
        let mut rng = StdRng::seed_from_u64(0);
        let u = mutant_rand_to_dir1(0, &pop, &energies, &f, &mut rng);
        // x_b + F (x_b - x_w) = (1,1) + 0.5 (-2,-1)
        assert_relative_eq!(u[0], 0.0);
        assert_relative_eq!(u[1], 0.5);
    }

    #[test]
    fn test_target_to_best_with_zero_factor_is_target() {
        let pop = array![[0.0], [1.0], [2.0], [3.0]];
        let f = array![0.0];
        let mut rng = StdRng::seed_from_u64(0);
        let u = mutant_target_to_best1(2, &pop, 0, &f, &mut rng);
        assert_eq!(u, array![2.0]);
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_insufficient_population() {
        let config = DEConfigBuilder::new().population(2).build().unwrap();
        let err = minimize(
            &sphere,
            array![-1.0, -1.0, -1.0],
            array![1.0, 1.0, 1.0],
            None,
            config,
        )
        .unwrap_err();
        assert_eq!(
            err,
            DEError::InsufficientPopulation {
                population: 2,
                required: 4
            }
        );
        assert!(err.is_config_error());
    }

    #[test]
    fn test_population_must_cover_strategy() {
        // dim + 1 = 3 but rand-to-best/2 draws five indices besides i and best
        let config = DEConfigBuilder::new()
            .population(6)
            .strategy(Strategy::RandToBest2)
            .build()
            .unwrap();
        let err = minimize(&sphere, array![-1.0, -1.0], array![1.0, 1.0], None, config);
        assert!(matches!(
            err,
            Err(DEError::InsufficientPopulation { required: 7, .. })
        ));
    }

    #[test]
    fn test_invalid_bounds() {
        let err = DifferentialEvolution::new(&sphere, array![0.0, 2.0], array![1.0, 1.0])
            .err()
            .unwrap();
        assert!(matches!(err, DEError::InvalidBounds { index: 1, .. }));
        assert!(err.is_bounds_error());
    }

    #[test]
    fn test_bounds_mismatch() {
        let err = DifferentialEvolution::new(&sphere, array![0.0, 2.0], array![1.0])
            .err()
            .unwrap();
        assert_eq!(
            err,
            DEError::BoundsMismatch {
                lower_len: 2,
                upper_len: 1
            }
        );
    }

    #[test]
    fn test_x0_dimension_mismatch() {
        let config = DEConfigBuilder::new().x0(array![0.0]).build().unwrap();
        let err = minimize(&sphere, array![-1.0, -1.0], array![1.0, 1.0], None, config);
        assert!(matches!(
            err,
            Err(DEError::X0DimensionMismatch {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_weight_matrix_mismatch_is_fatal() {
        let config = DEConfigBuilder::new().seed(1).build().unwrap();
        let w = Matrix::identity(3);
        let err = minimize(&sphere, array![-1.0, -1.0], array![1.0, 1.0], Some(w), config);
        assert!(matches!(err, Err(DEError::Weights(_))));
    }

    #[test]
    fn test_non_square_weights_rejected() {
        let mut de = DifferentialEvolution::new(&sphere, array![-1.0], array![1.0]).unwrap();
        assert!(matches!(
            de.set_weights(Matrix::zeros(1, 2)),
            Err(DEError::Weights(_))
        ));
    }
}

#[cfg(test)]
mod behaviour_tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_weighted_objective_and_final_residuals() {
        // minimum of r = (x - 1, y + 2) under W = diag(4, 1) is still (1, -2)
        let shifted = |x: &Array1<f64>| Ok::<_, Infallible>(array![x[0] - 1.0, x[1] + 2.0]);
        let config = DEConfigBuilder::new()
            .population(20)
            .epsilon(1e-10)
            .seed(5)
            .build()
            .unwrap();
        let w = Matrix::from_diagonal(&[4.0, 1.0]);
        let report =
            minimize(&shifted, array![-5.0, -5.0], array![5.0, 5.0], Some(w), config).unwrap();
        assert!((report.x[0] - 1.0).abs() < 1e-3);
        assert!((report.x[1] + 2.0).abs() < 1e-3);

        let r = report.residuals.expect("residuals at the optimum");
        let expected = 4.0 * r[0] * r[0] + r[1] * r[1];
        assert!((report.fun - expected).abs() <= 1e-12 * (1.0 + expected));
    }

    #[test]
    fn test_failing_functor_is_rejected_not_fatal() {
        // undefined for x < 0.5; the optimum of the defined region is on its edge
        let partial = |x: &Array1<f64>| {
            if x[0] < 0.5 {
                Err(format!("singular at {}", x[0]))
            } else {
                Ok(array![x[0], x[1]])
            }
        };
        let config = DEConfigBuilder::new()
            .population(20)
            .epsilon(1e-10)
            .max_generations(1500)
            .seed(11)
            .build()
            .unwrap();
        let report =
            minimize(&partial, array![-2.0, -2.0], array![2.0, 2.0], None, config).unwrap();
        assert!(report.fun < FAILED_EVALUATION);
        assert!(report.x[0] >= 0.5);
        assert!((report.fun - 0.25).abs() < 1e-3, "fun = {}", report.fun);
        assert!(report.residuals.is_some());
    }

    #[test]
    fn test_always_failing_functor_never_converges() {
        let broken = |_: &Array1<f64>| Err::<Array1<f64>, _>("no solution");
        let config = DEConfigBuilder::new()
            .population(5)
            .max_generations(30)
            .seed(2)
            .build()
            .unwrap();
        let report = minimize(&broken, array![0.0], array![1.0], None, config).unwrap();
        assert_eq!(report.fun, FAILED_EVALUATION);
        assert_eq!(report.termination, Termination::MaxGenerations);
        assert!(!report.success);
        assert_eq!(report.nit, 30);
        assert!(report.residuals.is_none());
        assert_eq!(report.nfev, 5 + 30 * 5);
    }

    #[test]
    fn test_nan_residuals_are_rejected() {
        let nan_left = |x: &Array1<f64>| {
            Ok::<_, Infallible>(array![if x[0] < 0.0 { f64::NAN } else { x[0] }])
        };
        let config = DEConfigBuilder::new()
            .population(8)
            .epsilon(1e-10)
            .seed(3)
            .build()
            .unwrap();
        let report = minimize(&nan_left, array![-1.0], array![1.0], None, config).unwrap();
        assert!(report.x[0] >= 0.0);
        assert!(report.fun.is_finite());
    }

    #[test]
    fn test_all_variables_fixed() {
        let config = DEConfigBuilder::new().build().unwrap();
        let report =
            minimize(&sphere, array![1.0, 2.0], array![1.0, 2.0], None, config).unwrap();
        assert_eq!(report.termination, Termination::AllFixed);
        assert_eq!(report.x, array![1.0, 2.0]);
        assert_eq!(report.fun, 5.0);
        assert_eq!(report.nit, 0);
        assert_eq!(report.population, array![[1.0, 2.0]]);
        assert_eq!(report.population_energies, array![5.0]);
    }

    #[test]
    fn test_all_fixed_still_validates_config() {
        let small = DEConfigBuilder::new().population(2).build().unwrap();
        assert!(matches!(
            minimize(&sphere, array![1.0, 2.0], array![1.0, 2.0], None, small),
            Err(DEError::InsufficientPopulation { population: 2, .. })
        ));

        let bad_x0 = DEConfigBuilder::new().x0(array![1.0]).build().unwrap();
        assert!(matches!(
            minimize(&sphere, array![1.0, 2.0], array![1.0, 2.0], None, bad_x0),
            Err(DEError::X0DimensionMismatch {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_fixed_dimension_stays_fixed() {
        let config = DEConfigBuilder::new()
            .population(10)
            .max_generations(100)
            .seed(8)
            .build()
            .unwrap();
        let report =
            minimize(&sphere, array![-1.0, 0.25], array![1.0, 0.25], None, config).unwrap();
        assert!(report.population.column(1).iter().all(|&v| v == 0.25));
    }

    #[test]
    fn test_x0_seeds_first_individual_reflected() {
        let config = DEConfigBuilder::new()
            .population(6)
            .max_generations(0)
            .x0(array![0.5, 1.5])
            .seed(4)
            .build()
            .unwrap();
        let report = minimize(&sphere, array![-1.0, -1.0], array![1.0, 1.0], None, config).unwrap();
        assert_eq!(report.population.row(0).to_owned(), array![0.5, 0.5]);
        assert_eq!(report.population_energies[0], 0.5);
        assert_eq!(report.nit, 0);
    }

    #[test]
    fn test_population_stays_in_bounds() {
        let config = DEConfigBuilder::new()
            .population(15)
            .f(1.5)
            .max_generations(50)
            .strategy(Strategy::RandToDir1)
            .seed(21)
            .build()
            .unwrap();
        let report = minimize(&sphere, array![2.0, -3.0], array![4.0, -1.0], None, config).unwrap();
        for row in report.population.rows() {
            assert!(row[0] >= 2.0 && row[0] <= 4.0);
            assert!(row[1] >= -3.0 && row[1] <= -1.0);
        }
    }

    #[test]
    fn test_callback_stops_at_generation_boundary() {
        let calls = Rc::new(Cell::new(0usize));
        let seen = calls.clone();
        let config = DEConfigBuilder::new()
            .population(10)
            .epsilon(0.0)
            .max_generations(1000)
            .seed(6)
            .callback(Box::new(move |inter: &DEIntermediate| {
                seen.set(seen.get() + 1);
                assert!(inter.spread >= 0.0);
                if inter.iter == 5 {
                    CallbackAction::Stop
                } else {
                    CallbackAction::Continue
                }
            }))
            .build()
            .unwrap();
        let report = minimize(&sphere, array![-5.0, -5.0], array![5.0, 5.0], None, config).unwrap();
        assert_eq!(calls.get(), 5);
        assert_eq!(report.nit, 5);
        assert_eq!(report.termination, Termination::Callback);
        assert_eq!(report.nfev, 10 + 5 * 10);
    }

    #[test]
    fn test_best_objective_never_increases() {
        let history = Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = history.clone();
        let config = DEConfigBuilder::new()
            .population(12)
            .max_generations(200)
            .strategy(Strategy::Sacp)
            .control(AdaptiveControl::Mfde)
            .seed(9)
            .callback(Box::new(move |inter: &DEIntermediate| {
                sink.borrow_mut().push(inter.fun);
                CallbackAction::Continue
            }))
            .build()
            .unwrap();
        minimize(&sphere, array![-5.0, -5.0], array![5.0, 5.0], None, config).unwrap();
        let history = history.borrow();
        assert!(!history.is_empty());
        for w in history.windows(2) {
            assert!(w[1] <= w[0]);
        }
    }
}
