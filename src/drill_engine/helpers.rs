//! Small shared functions used across the question builders and the session.
//!
//! Rendering is external: the session hands the renderer one string, already
//! wrapped in inline-math delimiters and with the ASCII operators swapped for
//! their typeset glyphs. Nothing here knows how that string gets drawn.

/// Greatest common divisor, always non-negative.
pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Expression text → renderer markup.
///
/// `/` becomes `÷`, `*` becomes `×`, and the result is wrapped in `\( … \)`.
/// Records whose expression already carries TeX (`\pi`, `^\circ`) keep it:
/// the renderer sees those verbatim.
pub fn display_markup(expression: &str) -> String {
    let body: String = expression
        .chars()
        .map(|c| match c {
            '/' => '÷',
            '*' => '×',
            other => other,
        })
        .collect();
    wrap_math(&body)
}

/// Wrap already-typeset text in inline-math delimiters.
pub fn wrap_math(body: &str) -> String {
    format!("\\({body}\\)")
}

/// Round to `places` decimals, for difficulties written to the corpus.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
