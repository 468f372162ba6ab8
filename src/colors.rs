use std::collections::BTreeMap;

pub type SubjectColorMap = BTreeMap<String, String>;

pub const DEFAULT_SUBJECT_COLOR: &str = "#4b5563";
pub const ROOT_COLOR: &str = "#111827";

const GOLDEN_ANGLE: f64 = 137.507764;
const MIN_HUE_DISTANCE: f64 = 22.0;
const MAX_HUE_TRIES: usize = 36;
const SATURATION: f64 = 68.0;
const LIGHTNESS: f64 = 46.0;

/// Assigns every distinct subject a stable hue, kept apart from its
/// neighbours on the wheel and out of the red range (reserved for warnings).
pub fn exam_subject_colors<S: AsRef<str>>(subject_names: &[S]) -> SubjectColorMap {
    let mut seen = std::collections::HashSet::new();
    let mut used_hues: Vec<f64> = Vec::new();
    let mut by_subject = SubjectColorMap::new();

    let names = subject_names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(*name));

    for (idx, name) in names.enumerate() {
        let seed = hash_string(name) as f64 + idx as f64 * GOLDEN_ANGLE;
        let mut hue = hue_avoiding_red(seed % 360.0);
        for _ in 0..MAX_HUE_TRIES {
            let near_existing = used_hues
                .iter()
                .any(|used| hue_distance(*used, hue) < MIN_HUE_DISTANCE);
            if !near_existing && !in_red_range(hue) {
                break;
            }
            hue = hue_avoiding_red(hue + GOLDEN_ANGLE);
        }
        used_hues.push(hue);
        by_subject.insert(name.to_string(), hsl_to_hex(hue, SATURATION, LIGHTNESS));
    }

    by_subject
}

fn hash_string(input: &str) -> i64 {
    let mut h: i32 = 0;
    for unit in input.encode_utf16() {
        h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit));
    }
    i64::from(h).abs()
}

fn in_red_range(hue: f64) -> bool {
    !(22.0..345.0).contains(&hue)
}

fn hue_avoiding_red(hue: f64) -> f64 {
    let h = hue.rem_euclid(360.0);
    if !in_red_range(h) {
        return h;
    }
    26.0 + h % 310.0
}

fn hue_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    let sat = s / 100.0;
    let light = l / 100.0;
    let c = (1.0 - (2.0 * light - 1.0).abs()) * sat;
    let hp = h / 60.0;
    let x = c * (1.0 - ((hp % 2.0) - 1.0).abs());
    let (r1, g1, b1) = match hp {
        hp if (0.0..1.0).contains(&hp) => (c, x, 0.0),
        hp if (1.0..2.0).contains(&hp) => (x, c, 0.0),
        hp if (2.0..3.0).contains(&hp) => (0.0, c, x),
        hp if (3.0..4.0).contains(&hp) => (0.0, x, c),
        hp if (4.0..5.0).contains(&hp) => (x, 0.0, c),
        hp if (5.0..6.0).contains(&hp) => (c, 0.0, x),
        _ => (0.0, 0.0, 0.0),
    };
    let m = light - c / 2.0;
    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", channel(r1), channel(g1), channel(b1))
}
