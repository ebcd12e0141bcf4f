//! Value formatting and argument parsing helpers

use glam::Vec3;

/// Format a vector with two decimals, printing near-zero components as 0
pub fn format_vec3(v: Vec3) -> String {
    let clean = |x: f32| if x.abs() < 0.005 { 0.0 } else { x };
    format!("{:.2}, {:.2}, {:.2}", clean(v.x), clean(v.y), clean(v.z))
}

pub fn format_seconds(seconds: f32) -> String {
    format!("{seconds:.3}s")
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Parse `x,y,z`
pub fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid component in '{s}': {e}"))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z but got '{s}'")),
    }
}

/// Parse a `name=value` pose parameter assignment
pub fn parse_pose(s: &str) -> Result<(String, f32), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value but got '{s}'"))?;
    let value = value
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("invalid value for '{name}': {e}"))?;
    Ok((name.trim().to_string(), value))
}
