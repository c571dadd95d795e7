/// Formats a value rounded to whole units with `,` thousands separators.
pub fn thousands(value: f64) -> String {
    grouped(value, 0)
}

/// Formats a value with `decimals` fraction digits and `,` separators in the integer part.
pub fn grouped(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = format!("{:.*}", decimals, value);
    let (sign, unsigned) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    let (digits, fraction) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };

    let mut out = String::with_capacity(rounded.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }

    // Rounding can leave "-0" or "-0.000".
    if out.chars().all(|c| c == '0' || c == '.') {
        return out;
    }
    format!("{}{}", sign, out)
}

/// Escapes text for Telegram HTML parse mode.
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
