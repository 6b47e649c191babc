//! 元素标准原子量（kg/kmol，即 g/mol）

/// 常见元素原子量；覆盖燃烧与常规过程计算所需的元素
pub fn atomic_weight(symbol: &str) -> Option<f64> {
    let w = match symbol {
        "H" => 1.008,
        "He" => 4.0026,
        "C" => 12.011,
        "N" => 14.007,
        "O" => 15.999,
        "F" => 18.998,
        "Ne" => 20.180,
        "Na" => 22.990,
        "Mg" => 24.305,
        "Al" => 26.982,
        "Si" => 28.085,
        "P" => 30.974,
        "S" => 32.06,
        "Cl" => 35.45,
        "Ar" => 39.948,
        "K" => 39.098,
        "Ca" => 40.078,
        "Fe" => 55.845,
        "Cu" => 63.546,
        "Zn" => 65.38,
        "Br" => 79.904,
        "I" => 126.904,
        _ => return None,
    };
    Some(w)
}
