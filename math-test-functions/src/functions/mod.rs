pub mod beale;
pub mod booth;
pub mod freudenstein_roth;
pub mod himmelblau;
pub mod rosenbrock;
pub mod sphere;

pub use beale::beale;
pub use booth::booth;
pub use freudenstein_roth::freudenstein_roth;
pub use himmelblau::himmelblau;
pub use rosenbrock::rosenbrock;
pub use sphere::sphere;
