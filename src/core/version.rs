use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Number(u64),
    Qualifier(String),
}

/// A Maven-style artifact version, ordered the way Maven resolves conflicts
/// closely enough to pick the newest of two declarations.
#[derive(Debug, Clone)]
pub struct MavenVersion {
    items: Vec<Item>,
}

impl MavenVersion {
    /// `None` for empty strings and unresolved `${...}` placeholders.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.contains("${") {
            return None;
        }

        let mut items = Vec::new();
        for part in trimmed.split(['.', '-', '_']) {
            let mut token = String::new();
            let mut digits = false;
            for c in part.chars() {
                let is_digit = c.is_ascii_digit();
                if !token.is_empty() && is_digit != digits {
                    items.push(Self::item(&token, digits)?);
                    token.clear();
                }
                digits = is_digit;
                token.push(c);
            }
            if !token.is_empty() {
                items.push(Self::item(&token, digits)?);
            }
        }

        if items.is_empty() {
            return None;
        }

        Some(Self { items })
    }

    fn item(token: &str, digits: bool) -> Option<Item> {
        if digits {
            token.parse().ok().map(Item::Number)
        } else {
            Some(Item::Qualifier(token.to_ascii_lowercase()))
        }
    }
}

fn qualifier_rank(qualifier: &str) -> u8 {
    match qualifier {
        "alpha" | "a" => 0,
        "beta" | "b" => 1,
        "milestone" | "m" => 2,
        "rc" | "cr" => 3,
        "snapshot" => 4,
        "" | "ga" | "final" | "release" => 5,
        "sp" => 6,
        _ => 7,
    }
}

fn compare_qualifiers(a: &str, b: &str) -> Ordering {
    qualifier_rank(a)
        .cmp(&qualifier_rank(b))
        .then_with(|| if qualifier_rank(a) == 7 { a.cmp(b) } else { Ordering::Equal })
}

/// Compares against the implicit padding of the shorter version.
fn compare_with_missing(item: &Item) -> Ordering {
    match item {
        Item::Number(n) => n.cmp(&0),
        Item::Qualifier(q) => compare_qualifiers(q, ""),
    }
}

fn compare_items(a: &Item, b: &Item) -> Ordering {
    match (a, b) {
        (Item::Number(x), Item::Number(y)) => x.cmp(y),
        (Item::Qualifier(x), Item::Qualifier(y)) => compare_qualifiers(x, y),
        (Item::Number(_), Item::Qualifier(_)) => Ordering::Greater,
        (Item::Qualifier(_), Item::Number(_)) => Ordering::Less,
    }
}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.items.len().max(other.items.len());
        for i in 0..len {
            let ord = match (self.items.get(i), other.items.get(i)) {
                (Some(a), Some(b)) => compare_items(a, b),
                (Some(a), None) => compare_with_missing(a),
                (None, Some(b)) => compare_with_missing(b).reverse(),
                (None, None) => Ordering::Equal,
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for MavenVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MavenVersion {}

/// `Some(true)` when `candidate` is strictly newer than `current`, `None`
/// when either side cannot be compared.
pub fn is_newer(candidate: &str, current: &str) -> Option<bool> {
    let candidate = MavenVersion::parse(candidate)?;
    let current = MavenVersion::parse(current)?;
    Some(candidate > current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> MavenVersion {
        MavenVersion::parse(s).unwrap()
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(v("1.10") > v("1.9"));
        assert!(v("2.0") > v("1.99.99"));
        assert!(v("4.13.2") > v("4.13"));
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("1"), v("1.0"));
    }

    #[test]
    fn test_qualifier_ordering() {
        assert!(v("1.0-alpha1") < v("1.0-beta1"));
        assert!(v("1.0-beta2") < v("1.0-rc1"));
        assert!(v("1.0-RC1") < v("1.0-SNAPSHOT"));
        assert!(v("1.0-SNAPSHOT") < v("1.0"));
        assert!(v("1.0") < v("1.0-sp1"));
        assert_eq!(v("1.0.Final"), v("1.0"));
        assert_eq!(v("5.3.9.RELEASE"), v("5.3.9"));
        assert!(v("1.0") < v("1.0.1"));
    }

    #[test]
    fn test_digit_letter_transitions_split() {
        assert!(v("1.0rc2") > v("1.0rc1"));
        assert!(v("1.0rc2") < v("1.0"));
    }

    #[test]
    fn test_incomparable_versions() {
        assert!(MavenVersion::parse("").is_none());
        assert!(MavenVersion::parse("${junit.version}").is_none());
        assert_eq!(is_newer("${x}", "1.0"), None);
        assert_eq!(is_newer("1.1", "1.0"), Some(true));
        assert_eq!(is_newer("1.0", "1.0.0"), Some(false));
    }
}
