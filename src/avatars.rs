use url::form_urlencoded;

const PALETTE: [&str; 6] = [
    "#877EFF", "#FF5A5A", "#34A853", "#F59E0B", "#0EA5E9", "#EC4899",
];

pub fn initials_url(public_url: &str, name: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(name.as_bytes()).collect();
    format!("{}/avatars/initials?name={}", public_url, encoded)
}

/// First letter of the first and last words, upper-cased.
pub fn initials(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let first = words.first().and_then(|w| w.chars().next());
    let last = if words.len() > 1 {
        words.last().and_then(|w| w.chars().next())
    } else {
        None
    };
    first
        .into_iter()
        .chain(last)
        .flat_map(char::to_uppercase)
        .collect()
}

pub fn initials_svg(name: &str) -> String {
    let text = initials(name);
    let color = PALETTE[name.bytes().map(usize::from).sum::<usize>() % PALETTE.len()];
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100" viewBox="0 0 100 100"><rect width="100" height="100" fill="{color}"/><text x="50" y="50" dy=".35em" text-anchor="middle" font-family="sans-serif" font-size="40" fill="#FFFFFF">{}</text></svg>"##,
        escape(&text)
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
