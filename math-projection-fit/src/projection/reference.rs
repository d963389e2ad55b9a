//! Spherical reference projections (Snyder, "Map Projections: A Working Manual").

use std::f64::consts::FRAC_PI_4;

use super::{LAT1, LAT2, LON0, Projection, ProjectionError, ProjectionParams, delta_lon};
use crate::error::{FitError, Result};

fn check_latitude(projection: &'static str, lat: f64, lon: f64) -> std::result::Result<(), ProjectionError> {
    if lat.abs() > 90.0 || !lat.is_finite() || !lon.is_finite() {
        return Err(ProjectionError::OutOfDomain {
            projection,
            lat,
            lon,
        });
    }
    Ok(())
}

/// Plate carrée with a true-scale parallel `lat1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equirectangular;

impl Projection for Equirectangular {
    fn name(&self) -> &'static str {
        "equirectangular"
    }

    fn project(
        &self,
        lat: f64,
        lon: f64,
        p: &ProjectionParams,
    ) -> std::result::Result<(f64, f64), ProjectionError> {
        check_latitude(self.name(), lat, lon)?;
        let dl = delta_lon(lon, p.lon0).to_radians();
        Ok((
            p.radius * dl * p.lat1.to_radians().cos(),
            p.radius * lat.to_radians(),
        ))
    }

    fn free_parameters(&self) -> &'static [usize] {
        &[LAT1, LON0]
    }
}

/// Normal-aspect Mercator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mercator;

impl Projection for Mercator {
    fn name(&self) -> &'static str {
        "mercator"
    }

    fn project(
        &self,
        lat: f64,
        lon: f64,
        p: &ProjectionParams,
    ) -> std::result::Result<(f64, f64), ProjectionError> {
        check_latitude(self.name(), lat, lon)?;
        let y = (FRAC_PI_4 + 0.5 * lat.to_radians()).tan().ln();
        if lat.abs() >= 90.0 || !y.is_finite() {
            // poles
            return Err(ProjectionError::OutOfDomain {
                projection: self.name(),
                lat,
                lon,
            });
        }
        Ok((p.radius * delta_lon(lon, p.lon0).to_radians(), p.radius * y))
    }

    fn free_parameters(&self) -> &'static [usize] {
        &[LON0]
    }
}

/// Sanson-Flamsteed sinusoidal equal-area projection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sinusoidal;

impl Projection for Sinusoidal {
    fn name(&self) -> &'static str {
        "sinusoidal"
    }

    fn project(
        &self,
        lat: f64,
        lon: f64,
        p: &ProjectionParams,
    ) -> std::result::Result<(f64, f64), ProjectionError> {
        check_latitude(self.name(), lat, lon)?;
        let phi = lat.to_radians();
        let dl = delta_lon(lon, p.lon0).to_radians();
        Ok((p.radius * dl * phi.cos(), p.radius * phi))
    }

    fn free_parameters(&self) -> &'static [usize] {
        &[LON0]
    }
}

/// Equidistant conic with two standard parallels, origin on the equator.
#[derive(Debug, Clone, Copy, Default)]
pub struct EquidistantConic;

impl EquidistantConic {
    /// Cone constant `n` and `G` of the parallels `lat1`, `lat2`.
    fn cone(&self, p: &ProjectionParams) -> std::result::Result<(f64, f64), ProjectionError> {
        let phi1 = p.lat1.to_radians();
        let phi2 = p.lat2.to_radians();
        let n = if (phi2 - phi1).abs() < 1e-10 {
            phi1.sin()
        } else {
            (phi1.cos() - phi2.cos()) / (phi2 - phi1)
        };
        if n.abs() < 1e-10 || !n.is_finite() {
            return Err(ProjectionError::InvalidParameters {
                projection: self.name(),
                reason: format!("parallels {} and {} give a flat cone", p.lat1, p.lat2),
            });
        }
        Ok((n, phi1.cos() / n + phi1))
    }
}

impl Projection for EquidistantConic {
    fn name(&self) -> &'static str {
        "equidistant_conic"
    }

    fn project(
        &self,
        lat: f64,
        lon: f64,
        p: &ProjectionParams,
    ) -> std::result::Result<(f64, f64), ProjectionError> {
        check_latitude(self.name(), lat, lon)?;
        let (n, g) = self.cone(p)?;
        let rho = p.radius * (g - lat.to_radians());
        let rho0 = p.radius * g;
        let theta = n * delta_lon(lon, p.lon0).to_radians();
        Ok((rho * theta.sin(), rho0 - rho * theta.cos()))
    }

    fn free_parameters(&self) -> &'static [usize] {
        &[LAT1, LAT2, LON0]
    }
}

/// Oblique Lambert azimuthal equal-area projection centred on `(lat1, lon0)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LambertAzimuthal;

impl Projection for LambertAzimuthal {
    fn name(&self) -> &'static str {
        "lambert_azimuthal"
    }

    fn project(
        &self,
        lat: f64,
        lon: f64,
        p: &ProjectionParams,
    ) -> std::result::Result<(f64, f64), ProjectionError> {
        check_latitude(self.name(), lat, lon)?;
        let (sin_phi, cos_phi) = lat.to_radians().sin_cos();
        let (sin_phi1, cos_phi1) = p.lat1.to_radians().sin_cos();
        let (sin_dl, cos_dl) = delta_lon(lon, p.lon0).to_radians().sin_cos();

        let denom = 1.0 + sin_phi1 * sin_phi + cos_phi1 * cos_phi * cos_dl;
        if denom < 1e-12 {
            // antipode of the centre
            return Err(ProjectionError::OutOfDomain {
                projection: self.name(),
                lat,
                lon,
            });
        }
        let k = (2.0 / denom).sqrt();
        Ok((
            p.radius * k * cos_phi * sin_dl,
            p.radius * k * (cos_phi1 * sin_phi - sin_phi1 * cos_phi * cos_dl),
        ))
    }

    fn free_parameters(&self) -> &'static [usize] {
        &[LAT1, LON0]
    }
}

/// All reference projections.
pub fn reference_catalog() -> Vec<Box<dyn Projection>> {
    vec![
        Box::new(Equirectangular),
        Box::new(Mercator),
        Box::new(Sinusoidal),
        Box::new(EquidistantConic),
        Box::new(LambertAzimuthal),
    ]
}

/// Looks a projection up by name; case and `-`/`_` are not significant.
pub fn projection_by_name(name: &str) -> Result<Box<dyn Projection>> {
    let key = name.trim().to_lowercase().replace('-', "_");
    reference_catalog()
        .into_iter()
        .find(|p| p.name() == key)
        .ok_or_else(|| FitError::UnknownProjection(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit(lat1: f64, lat2: f64, lon0: f64) -> ProjectionParams {
        ProjectionParams {
            radius: 1.0,
            lat1,
            lat2,
            lon0,
        }
    }

    #[test]
    fn test_origin_maps_to_origin() {
        let p = unit(0.0, 0.0, 0.0);
        for proj in [
            Box::new(Equirectangular) as Box<dyn Projection>,
            Box::new(Mercator),
            Box::new(Sinusoidal),
            Box::new(LambertAzimuthal),
        ] {
            let (x, y) = proj.project(0.0, 0.0, &p).unwrap();
            assert_relative_eq!(x, 0.0, epsilon = 1e-15);
            assert_relative_eq!(y, 0.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_equirectangular_scale() {
        let (x, y) = Equirectangular
            .project(45.0, 90.0, &unit(60.0, 0.0, 0.0))
            .unwrap();
        assert_relative_eq!(x, 0.25 * std::f64::consts::PI, epsilon = 1e-12);
        assert_relative_eq!(y, 0.25 * std::f64::consts::PI, epsilon = 1e-12);
    }

    #[test]
    fn test_mercator_known_value() {
        // y(45°) = ln(tan(67.5°)) = asinh(1)
        let (_, y) = Mercator.project(45.0, 0.0, &unit(0.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(y, 1.0f64.asinh(), epsilon = 1e-12);
        assert!(Mercator.project(90.0, 0.0, &unit(0.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_sinusoidal_meridian_convergence() {
        let p = unit(0.0, 0.0, 20.0);
        let (x_eq, _) = Sinusoidal.project(0.0, 50.0, &p).unwrap();
        let (x_60, _) = Sinusoidal.project(60.0, 50.0, &p).unwrap();
        assert_relative_eq!(x_60, 0.5 * x_eq, epsilon = 1e-12);
    }

    #[test]
    fn test_conic_parallels_are_equidistant() {
        // distance along the central meridian equals the arc length
        let p = unit(30.0, 60.0, 0.0);
        let (_, y40) = EquidistantConic.project(40.0, 0.0, &p).unwrap();
        let (_, y50) = EquidistantConic.project(50.0, 0.0, &p).unwrap();
        assert_relative_eq!(y50 - y40, 10f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_conic_symmetric_in_parallels() {
        let a = EquidistantConic
            .project(45.0, 12.0, &unit(30.0, 60.0, 0.0))
            .unwrap();
        let b = EquidistantConic
            .project(45.0, 12.0, &unit(60.0, 30.0, 0.0))
            .unwrap();
        assert_relative_eq!(a.0, b.0, epsilon = 1e-12);
        assert_relative_eq!(a.1, b.1, epsilon = 1e-12);
    }

    #[test]
    fn test_conic_rejects_flat_cone() {
        let err = EquidistantConic
            .project(10.0, 10.0, &unit(-30.0, 30.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidParameters { .. }));
    }

    #[test]
    fn test_lambert_preserves_area_scale_at_centre() {
        // distance to the centre is 2 R sin(c / 2)
        let p = unit(40.0, 0.0, 10.0);
        let (x, y) = LambertAzimuthal.project(40.0, 10.0, &p).unwrap();
        assert_relative_eq!(x.hypot(y), 0.0, epsilon = 1e-12);
        let (x, y) = LambertAzimuthal.project(70.0, 10.0, &p).unwrap();
        assert_relative_eq!(x.hypot(y), 2.0 * 15f64.to_radians().sin(), epsilon = 1e-12);
        assert!(LambertAzimuthal.project(-40.0, -170.0, &p).is_err());
    }

    #[test]
    fn test_catalogue_lookup() {
        let names: Vec<_> = reference_catalog().iter().map(|p| p.name()).collect();
        assert_eq!(names.len(), 5);
        assert_eq!(
            projection_by_name("Equidistant-Conic").unwrap().name(),
            "equidistant_conic"
        );
        assert!(matches!(
            projection_by_name("robinson"),
            Err(FitError::UnknownProjection(_))
        ));
    }
}
