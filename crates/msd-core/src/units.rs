// msd-core/src/units.rs

use uom::si::f64::{
    Area as UomArea, Length as UomLength, LinearMassDensity as UomLinearMassDensity,
    MassDensity as UomMassDensity,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Density = UomMassDensity;
pub type Length = UomLength;
pub type LinearDensity = UomLinearMassDensity;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn kg_per_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

/// Area of a circular bellow of the given radius.
#[inline]
pub fn disc_area(radius: Length) -> Area {
    radius * radius * std::f64::consts::PI
}

/// Mass of fluid per unit of bellow stroke: rho * A.
#[inline]
pub fn fluid_column_density(rho: Density, area: Area) -> LinearDensity {
    rho * area
}

/// Plain kg/m value for use in scalar force laws.
#[inline]
pub fn kg_per_m(density: LinearDensity) -> f64 {
    use uom::si::linear_mass_density::kilogram_per_meter;
    density.get::<kilogram_per_meter>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_are_si() {
        use uom::si::length::centimeter;
        use uom::si::mass_density::gram_per_cubic_centimeter;
        assert!((m(0.01).get::<centimeter>() - 1.0).abs() < 1e-12);
        assert!((kg_per_m3(1000.0).get::<gram_per_cubic_centimeter>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bellow_fluid_column() {
        // rho = 1000 kg/m³, r = 1 cm → rho * pi * r² ≈ 0.314159 kg/m
        let area = disc_area(m(0.01));
        let column = fluid_column_density(kg_per_m3(1000.0), area);
        let expected = 1000.0 * std::f64::consts::PI * 0.01 * 0.01;
        assert!((kg_per_m(column) - expected).abs() < 1e-12);
    }
}
