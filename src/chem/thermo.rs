//! 理想气体热力学估算
//!
//! 常见物种的生成焓 / 标准熵 / 比热查表，在此之上做三件事：
//! 物种热力学性质（J/kmol 基准）、绝热火焰温度（完全燃烧能量平衡）、
//! 完全转化近似下的平衡组成。均为工程估算。

use std::collections::BTreeMap;

use crate::chem::formula::{parse_formula, parse_mixture};
use crate::chem::ChemError;

/// 通用气体常数 J/(mol·K)
const R: f64 = 8.314_462;
/// 标准参考温度 K
const T_REF: f64 = 298.15;
/// 标准参考压力 Pa
const P_REF: f64 = 101_325.0;
/// 空气中 N2 / O2 摩尔比
const AIR_N2_PER_O2: f64 = 3.76;

/// 单物种表项：生成焓 kJ/mol、标准熵 J/(mol·K)、298K 比热与高温区平均比热 J/(mol·K)
struct SpeciesData {
    hf: f64,
    s0: f64,
    cp: f64,
    cp_mean: f64,
}

fn species_data(name: &str) -> Option<SpeciesData> {
    let (hf, s0, cp, cp_mean) = match name.to_ascii_uppercase().as_str() {
        "CH4" => (-74.87, 186.25, 35.69, 71.0),
        "C2H6" => (-84.0, 229.2, 52.5, 105.0),
        "C3H8" => (-104.7, 270.3, 73.6, 150.0),
        "C2H4" => (52.4, 219.3, 42.9, 85.0),
        "C2H5OH" => (-234.8, 281.6, 65.6, 130.0),
        "H2" => (0.0, 130.68, 28.84, 31.0),
        "O2" => (0.0, 205.15, 29.38, 34.9),
        "N2" => (0.0, 191.61, 29.12, 32.7),
        "CO2" => (-393.52, 213.79, 37.13, 56.2),
        "H2O" => (-241.83, 188.84, 33.59, 45.7),
        "CO" => (-110.53, 197.66, 29.14, 33.2),
        "NO" => (91.3, 210.76, 29.86, 33.0),
        "NH3" => (-45.9, 192.77, 35.06, 55.0),
        "OH" => (38.99, 183.74, 29.89, 33.0),
        "H" => (218.0, 114.72, 20.79, 20.79),
        "O" => (249.18, 161.06, 21.91, 21.91),
        "AR" => (0.0, 154.85, 20.79, 20.79),
        "HE" => (0.0, 126.15, 20.79, 20.79),
        _ => return None,
    };
    Some(SpeciesData { hf, s0, cp, cp_mean })
}

/// 物种热力学性质，J/kmol 与 J/(kmol·K) 基准（与机理计算结果同单位）
#[derive(Clone, Copy, Debug)]
pub struct ThermoProperties {
    pub enthalpy_kmol: f64,
    pub entropy_kmol: f64,
    pub gibbs_kmol: f64,
    pub cp_kmol: f64,
}

/// 指定温度 / 压力下的物种热力学性质（常比热近似）
pub fn species_thermo(
    species: &str,
    temperature_k: f64,
    pressure_pa: f64,
) -> Result<ThermoProperties, ChemError> {
    if !(temperature_k.is_finite() && temperature_k > 0.0) {
        return Err(ChemError::InvalidInput(format!(
            "temperature must be positive, got {} K",
            temperature_k
        )));
    }
    if !(pressure_pa.is_finite() && pressure_pa > 0.0) {
        return Err(ChemError::InvalidInput(format!(
            "pressure must be positive, got {} Pa",
            pressure_pa
        )));
    }
    let data =
        species_data(species).ok_or_else(|| ChemError::UnknownSpecies(species.to_string()))?;

    // J/mol 基准计算，最后换算为 J/kmol
    let h = data.hf * 1e3 + data.cp * (temperature_k - T_REF);
    let s = data.s0 + data.cp * (temperature_k / T_REF).ln() - R * (pressure_pa / P_REF).ln();
    let g = h - temperature_k * s;

    Ok(ThermoProperties {
        enthalpy_kmol: h * 1e3,
        entropy_kmol: s * 1e3,
        gibbs_kmol: g * 1e3,
        cp_kmol: data.cp * 1e3,
    })
}

/// 燃料元素组成（每摩尔燃料的 C / H / O / N 原子数）
struct FuelAtoms {
    c: f64,
    h: f64,
    o: f64,
    n: f64,
}

fn fuel_atoms(fuel: &str) -> Result<FuelAtoms, ChemError> {
    let counts = parse_formula(fuel)?;
    let mut atoms = FuelAtoms {
        c: 0.0,
        h: 0.0,
        o: 0.0,
        n: 0.0,
    };
    for (el, n) in counts {
        match el.as_str() {
            "C" => atoms.c = n as f64,
            "H" => atoms.h = n as f64,
            "O" => atoms.o = n as f64,
            "N" => atoms.n = n as f64,
            other => {
                return Err(ChemError::InvalidInput(format!(
                    "fuel element '{}' is not supported in combustion balance",
                    other
                )))
            }
        }
    }
    Ok(atoms)
}

/// 绝热火焰温度（K）：完全燃烧 + 平均比热的能量平衡。
/// phi < 1 贫燃（过量 O2 进产物）、phi > 1 富燃（按 1/phi 份额燃烧，余下燃料随产物升温）。
pub fn adiabatic_flame_temperature(
    fuel: &str,
    oxidizer: &str,
    equivalence_ratio: f64,
    initial_temp_k: f64,
    initial_pressure_pa: f64,
) -> Result<f64, ChemError> {
    if !(equivalence_ratio.is_finite() && equivalence_ratio > 0.0) {
        return Err(ChemError::InvalidInput(format!(
            "equivalence ratio must be positive, got {}",
            equivalence_ratio
        )));
    }
    if !(initial_temp_k.is_finite() && initial_temp_k > 0.0) {
        return Err(ChemError::InvalidInput(format!(
            "initial temperature must be positive, got {} K",
            initial_temp_k
        )));
    }
    if !(initial_pressure_pa.is_finite() && initial_pressure_pa > 0.0) {
        return Err(ChemError::InvalidInput(format!(
            "initial pressure must be positive, got {} Pa",
            initial_pressure_pa
        )));
    }

    let with_nitrogen = match oxidizer.trim().to_ascii_lowercase().as_str() {
        "air" => true,
        "o2" => false,
        other => return Err(ChemError::UnsupportedOxidizer(other.to_string())),
    };

    let fuel_data =
        species_data(fuel).ok_or_else(|| ChemError::UnknownSpecies(fuel.to_string()))?;
    let atoms = fuel_atoms(fuel)?;

    // 化学计量 O2 需求（每摩尔燃料）
    let stoich_o2 = atoms.c + atoms.h / 4.0 - atoms.o / 2.0;
    if stoich_o2 <= 0.0 {
        return Err(ChemError::InvalidInput(format!(
            "'{}' is not a combustible fuel",
            fuel
        )));
    }

    let phi = equivalence_ratio;
    let o2_supplied = stoich_o2 / phi;
    let n2_supplied = if with_nitrogen {
        o2_supplied * AIR_N2_PER_O2
    } else {
        0.0
    };

    // 燃烧份额：贫燃全部烧完，富燃受 O2 限制
    let burned = if phi <= 1.0 { 1.0 } else { 1.0 / phi };

    // 产物（每摩尔进料燃料）
    let co2 = atoms.c * burned;
    let h2o = atoms.h / 2.0 * burned;
    let o2_excess = (o2_supplied - stoich_o2 * burned).max(0.0);
    let fuel_unburned = 1.0 - burned;
    let n2_product = n2_supplied + atoms.n / 2.0 * burned;

    let d = |name: &str| {
        species_data(name).ok_or_else(|| ChemError::UnknownSpecies(name.to_string()))
    };
    let (co2_d, h2o_d, o2_d, n2_d) = (d("CO2")?, d("H2O")?, d("O2")?, d("N2")?);

    // 反应焓（J，每摩尔进料燃料；放热为正）
    let heat_release = (burned * fuel_data.hf - co2 * co2_d.hf - h2o * h2o_d.hf) * 1e3;

    // 反应物自 T0 带入的显热（298.15 K 基准）
    let reactant_sensible = (fuel_data.cp + o2_supplied * o2_d.cp + n2_supplied * n2_d.cp)
        * (initial_temp_k - T_REF);

    // 产物热容（高温区平均比热）
    let product_capacity = co2 * co2_d.cp_mean
        + h2o * h2o_d.cp_mean
        + o2_excess * o2_d.cp_mean
        + fuel_unburned * fuel_data.cp_mean
        + n2_product * n2_d.cp_mean;
    if product_capacity <= 0.0 {
        return Err(ChemError::InvalidInput(
            "no products to absorb heat of reaction".to_string(),
        ));
    }

    let t_ad = T_REF + (heat_release + reactant_sensible) / product_capacity;
    if !t_ad.is_finite() || t_ad <= 0.0 {
        return Err(ChemError::InvalidInput(
            "energy balance did not converge to a physical temperature".to_string(),
        ));
    }
    Ok(t_ad)
}

/// 平衡组成（摩尔分数）：完全转化近似。含 C/H 的物种与可用 O2 完全燃烧为 CO2 / H2O，
/// O2 不足时按比例燃烧，惰性物种原样通过；返回归一化摩尔分数。
pub fn equilibrium_composition(
    mixture: &str,
    temperature_k: f64,
    pressure_pa: f64,
) -> Result<BTreeMap<String, f64>, ChemError> {
    if !(temperature_k.is_finite() && temperature_k > 0.0) {
        return Err(ChemError::InvalidInput(format!(
            "temperature must be positive, got {} K",
            temperature_k
        )));
    }
    if !(pressure_pa.is_finite() && pressure_pa > 0.0) {
        return Err(ChemError::InvalidInput(format!(
            "pressure must be positive, got {} Pa",
            pressure_pa
        )));
    }

    let entries = parse_mixture(mixture)?;

    let mut o2_available = 0.0;
    let mut fuels: Vec<(String, f64, FuelAtoms, f64)> = Vec::new(); // (name, moles, atoms, stoich O2)
    let mut inerts: BTreeMap<String, f64> = BTreeMap::new();

    for (species, moles) in &entries {
        if species.eq_ignore_ascii_case("O2") {
            o2_available += moles;
            continue;
        }
        let atoms = fuel_atoms(species);
        match atoms {
            Ok(a) if a.c + a.h > 0.0 => {
                let stoich = a.c + a.h / 4.0 - a.o / 2.0;
                if stoich > 0.0 {
                    fuels.push((species.clone(), *moles, a, stoich));
                    continue;
                }
                *inerts.entry(species.clone()).or_insert(0.0) += moles;
            }
            _ => {
                *inerts.entry(species.clone()).or_insert(0.0) += moles;
            }
        }
    }

    let o2_demand: f64 = fuels.iter().map(|(_, n, _, s)| n * s).sum();
    let burn_fraction = if o2_demand <= 0.0 {
        0.0
    } else {
        (o2_available / o2_demand).min(1.0)
    };

    let mut products: BTreeMap<String, f64> = inerts;
    let mut co2 = 0.0;
    let mut h2o = 0.0;
    let mut n2_from_fuel = 0.0;
    for (name, moles, atoms, _) in &fuels {
        let burned = moles * burn_fraction;
        co2 += atoms.c * burned;
        h2o += atoms.h / 2.0 * burned;
        n2_from_fuel += atoms.n / 2.0 * burned;
        let leftover = moles - burned;
        if leftover > 1e-12 {
            *products.entry(name.clone()).or_insert(0.0) += leftover;
        }
    }
    let o2_left = o2_available - o2_demand * burn_fraction;

    if co2 > 0.0 {
        *products.entry("CO2".to_string()).or_insert(0.0) += co2;
    }
    if h2o > 0.0 {
        *products.entry("H2O".to_string()).or_insert(0.0) += h2o;
    }
    if n2_from_fuel > 0.0 {
        *products.entry("N2".to_string()).or_insert(0.0) += n2_from_fuel;
    }
    if o2_left > 1e-12 {
        *products.entry("O2".to_string()).or_insert(0.0) += o2_left;
    }

    let total: f64 = products.values().sum();
    if total <= 0.0 {
        return Err(ChemError::BadMixture(mixture.to_string()));
    }
    Ok(products
        .into_iter()
        .map(|(k, v)| (k, v / total))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methane_air_stoichiometric_flame_is_plausible() {
        let t = adiabatic_flame_temperature("CH4", "air", 1.0, 300.0, 101_325.0).unwrap();
        assert!(
            (1900.0..2600.0).contains(&t),
            "stoichiometric CH4/air AFT out of range: {} K",
            t
        );
    }

    #[test]
    fn lean_flame_is_cooler_than_stoichiometric() {
        let stoich = adiabatic_flame_temperature("CH4", "air", 1.0, 300.0, 101_325.0).unwrap();
        let lean = adiabatic_flame_temperature("CH4", "air", 0.6, 300.0, 101_325.0).unwrap();
        assert!(lean < stoich);
    }

    #[test]
    fn pure_oxygen_flame_is_hotter_than_air() {
        let air = adiabatic_flame_temperature("CH4", "air", 1.0, 300.0, 101_325.0).unwrap();
        let oxy = adiabatic_flame_temperature("CH4", "O2", 1.0, 300.0, 101_325.0).unwrap();
        assert!(oxy > air);
    }

    #[test]
    fn flame_rejects_bad_inputs() {
        assert!(adiabatic_flame_temperature("CH4", "air", 0.0, 300.0, 101_325.0).is_err());
        assert!(adiabatic_flame_temperature("CH4", "chlorine", 1.0, 300.0, 101_325.0).is_err());
        assert!(adiabatic_flame_temperature("XQ9", "air", 1.0, 300.0, 101_325.0).is_err());
        assert!(adiabatic_flame_temperature("N2", "air", 1.0, 300.0, 101_325.0).is_err());
    }

    #[test]
    fn equilibrium_fractions_sum_to_one() {
        let x = equilibrium_composition("CH4:1, O2:2, N2:7.52", 2000.0, 101_325.0).unwrap();
        let total: f64 = x.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        // 化学计量燃烧：甲烷应全部转化
        assert!(!x.contains_key("CH4"));
        assert!(x.contains_key("CO2"));
        assert!(x.contains_key("H2O"));
        assert!(x["N2"] > 0.5);
    }

    #[test]
    fn rich_mixture_leaves_unburned_fuel() {
        let x = equilibrium_composition("CH4:2, O2:2", 1500.0, 101_325.0).unwrap();
        assert!(x.contains_key("CH4"));
        assert!(!x.contains_key("O2"));
    }

    #[test]
    fn species_thermo_units_and_errors() {
        let p = species_thermo("CO2", 298.15, 101_325.0).unwrap();
        // 参考态下焓应等于生成焓（J/kmol）
        assert!((p.enthalpy_kmol - (-393.52e6)).abs() < 1e4);
        assert!(p.entropy_kmol > 0.0);
        assert!(p.gibbs_kmol < p.enthalpy_kmol);

        assert!(species_thermo("UNOBTAINIUM", 300.0, 101_325.0).is_err());
        assert!(species_thermo("CO2", -5.0, 101_325.0).is_err());
    }
}
