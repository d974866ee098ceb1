/// One tagged image, loaded once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRecord {
    pub name: String,
    pub tag: String,
}

impl ImageRecord {
    /// Split a `repo:tag` reference. The tag separator is the last colon after
    /// the final slash so registry ports (`host:5000/app:1.2`) stay in the name.
    /// Untagged references (`<none>:<none>`) yield `None`.
    pub fn from_reference(reference: &str) -> Option<Self> {
        if reference.starts_with("<none>") {
            return None;
        }
        let slash = reference.rfind('/').map(|i| i + 1).unwrap_or(0);
        let (name, tag) = match reference[slash..].rfind(':') {
            Some(i) => (&reference[..slash + i], &reference[slash + i + 1..]),
            None => (reference, "latest"),
        };
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            tag: tag.to_string(),
        })
    }

    pub fn reference(&self) -> String {
        format!("{}:{}", self.name, self.tag)
    }
}
