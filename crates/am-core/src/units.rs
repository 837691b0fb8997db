// am-core/src/units.rs

use uom::si::f64::{
    Acceleration as UomAcceleration, Angle as UomAngle, Area as UomArea, Energy as UomEnergy,
    Force as UomForce, Length as UomLength, Mass as UomMass, MassDensity as UomMassDensity,
    Power as UomPower, Pressure as UomPressure, Ratio as UomRatio,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
    Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Accel = UomAcceleration;
pub type Angle = UomAngle;
pub type Area = UomArea;
pub type Density = UomMassDensity;
pub type Energy = UomEnergy;
pub type Force = UomForce;
pub type Length = UomLength;
pub type Mass = UomMass;
pub type Power = UomPower;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Velocity = UomVelocity;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn ft(v: f64) -> Length {
    use uom::si::length::foot;
    Length::new::<foot>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn mph(v: f64) -> Velocity {
    use uom::si::velocity::mile_per_hour;
    Velocity::new::<mile_per_hour>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn rad(v: f64) -> Angle {
    use uom::si::angle::radian;
    Angle::new::<radian>(v)
}

#[inline]
pub fn deg(v: f64) -> Angle {
    use uom::si::angle::degree;
    Angle::new::<degree>(v)
}

#[inline]
pub fn sq_m(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn w(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn newton(v: f64) -> Force {
    use uom::si::force::newton;
    Force::new::<newton>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

pub mod constants {
    use super::*;

    /// Standard gravitational acceleration (m/s^2)
    pub const G0_MPS2: f64 = 9.806_65;

    /// Specific gas constant of dry air (J/(kg K))
    pub const R_AIR: f64 = 287.052_87;

    /// Ratio of specific heats of dry air
    pub const GAMMA_AIR: f64 = 1.4;

    /// Sea-level standard pressure (Pa)
    pub const P0_PA: f64 = 101_325.0;

    /// Sea-level standard temperature (K)
    pub const T0_K: f64 = 288.15;

    #[inline]
    pub fn g0() -> Accel {
        use uom::si::acceleration::meter_per_second_squared;
        Accel::new::<meter_per_second_squared>(G0_MPS2)
    }
}
