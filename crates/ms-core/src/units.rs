// ms-core/src/units.rs

use uom::si::f64::ElectricCharge as UomElectricCharge;

// Public canonical unit types (SI, f64)
pub type Charge = UomElectricCharge;

/// Battery capacity as usually quoted on a cell datasheet.
#[inline]
pub fn amp_hours(v: f64) -> Charge {
    use uom::si::electric_charge::ampere_hour;
    Charge::new::<ampere_hour>(v)
}

#[inline]
pub fn in_coulombs(q: Charge) -> f64 {
    use uom::si::electric_charge::coulomb;
    q.get::<coulomb>()
}
