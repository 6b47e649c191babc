//! 化学式与混合物配比解析
//!
//! 化学式支持元素计数与括号分组（如 C2H5OH、Ca(OH)2）；混合物串为
//! `SPECIES:moles, SPECIES:moles` 形式（与机理文件的 TPX 写法一致）。

use std::collections::BTreeMap;

use crate::chem::periodic::atomic_weight;
use crate::chem::ChemError;

/// 解析化学式为 元素 -> 个数；大小写遵循元素符号惯例，
/// 全大写的双字母物种名（如机理文件中的 AR）按符号做一次大小写回退。
pub fn parse_formula(formula: &str) -> Result<BTreeMap<String, u32>, ChemError> {
    let formula = formula.trim();
    if formula.is_empty() {
        return Err(ChemError::BadFormula(formula.to_string()));
    }

    // 回退：整个串就是一个元素符号（不区分大小写），如 "AR" -> Ar
    if let Some(symbol) = symbol_case_fallback(formula) {
        let mut counts = BTreeMap::new();
        counts.insert(symbol, 1);
        return Ok(counts);
    }

    let chars: Vec<char> = formula.chars().collect();
    let mut pos = 0usize;
    let counts = parse_group(&chars, &mut pos, formula)?;
    if pos != chars.len() {
        return Err(ChemError::BadFormula(formula.to_string()));
    }
    if counts.is_empty() {
        return Err(ChemError::BadFormula(formula.to_string()));
    }
    Ok(counts)
}

fn symbol_case_fallback(token: &str) -> Option<String> {
    if token.len() > 2 || !token.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let mut chars = token.chars();
    let first = chars.next()?.to_ascii_uppercase();
    let rest: String = chars.map(|c| c.to_ascii_lowercase()).collect();
    let candidate = format!("{}{}", first, rest);
    // 单大写字母同时可能是元素（C、H、O...），交给常规解析
    if candidate.len() == 1 {
        return None;
    }
    atomic_weight(&candidate).map(|_| candidate)
}

fn parse_group(
    chars: &[char],
    pos: &mut usize,
    original: &str,
) -> Result<BTreeMap<String, u32>, ChemError> {
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();

    while *pos < chars.len() {
        match chars[*pos] {
            '(' => {
                *pos += 1;
                let inner = parse_group(chars, pos, original)?;
                if *pos >= chars.len() || chars[*pos] != ')' {
                    return Err(ChemError::BadFormula(original.to_string()));
                }
                *pos += 1;
                let multiplier = parse_count(chars, pos, original)?;
                for (el, n) in inner {
                    let scaled = n
                        .checked_mul(multiplier)
                        .ok_or_else(|| ChemError::BadFormula(original.to_string()))?;
                    add_count(&mut counts, el, scaled, original)?;
                }
            }
            ')' => break,
            c if c.is_ascii_uppercase() => {
                let mut symbol = c.to_string();
                *pos += 1;
                if *pos < chars.len() && chars[*pos].is_ascii_lowercase() {
                    symbol.push(chars[*pos]);
                    *pos += 1;
                }
                if atomic_weight(&symbol).is_none() {
                    return Err(ChemError::UnknownSpecies(original.to_string()));
                }
                let count = parse_count(chars, pos, original)?;
                add_count(&mut counts, symbol, count, original)?;
            }
            _ => return Err(ChemError::BadFormula(original.to_string())),
        }
    }

    Ok(counts)
}

/// 解析元素 / 分组后缀计数；无数字为 1，超出 u32 范围的数字串直接拒绝
fn parse_count(chars: &[char], pos: &mut usize, original: &str) -> Result<u32, ChemError> {
    let start = *pos;
    while *pos < chars.len() && chars[*pos].is_ascii_digit() {
        *pos += 1;
    }
    if start == *pos {
        return Ok(1);
    }
    chars[start..*pos]
        .iter()
        .collect::<String>()
        .parse()
        .map_err(|_| ChemError::BadFormula(original.to_string()))
}

/// 累加元素计数；溢出按格式错误拒绝而不是回绕
fn add_count(
    counts: &mut BTreeMap<String, u32>,
    element: String,
    amount: u32,
    original: &str,
) -> Result<(), ChemError> {
    let slot = counts.entry(element).or_insert(0);
    *slot = slot
        .checked_add(amount)
        .ok_or_else(|| ChemError::BadFormula(original.to_string()))?;
    Ok(())
}

/// 摩尔质量（kg/kmol，数值上等于 g/mol）
pub fn molecular_weight(formula: &str) -> Result<f64, ChemError> {
    let counts = parse_formula(formula)?;
    let mut total = 0.0;
    for (el, n) in counts {
        let w = atomic_weight(&el).ok_or(ChemError::UnknownSpecies(el))?;
        total += w * n as f64;
    }
    Ok(total)
}

/// 解析混合物配比串为 物种 -> 摩尔数；物种名保留原写法，摩尔数必须为正
pub fn parse_mixture(mixture: &str) -> Result<Vec<(String, f64)>, ChemError> {
    let mut entries = Vec::new();
    for item in mixture.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let (species, amount) = item
            .split_once(':')
            .ok_or_else(|| ChemError::BadMixture(mixture.to_string()))?;
        let species = species.trim();
        let amount: f64 = amount
            .trim()
            .parse()
            .map_err(|_| ChemError::BadMixture(mixture.to_string()))?;
        if species.is_empty() || !amount.is_finite() || amount <= 0.0 {
            return Err(ChemError::BadMixture(mixture.to_string()));
        }
        parse_formula(species)?;
        entries.push((species.to_string(), amount));
    }
    if entries.is_empty() {
        return Err(ChemError::BadMixture(mixture.to_string()));
    }
    Ok(entries)
}
