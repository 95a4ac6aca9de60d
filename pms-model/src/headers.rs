use http::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderName, InvalidHeaderValue};
use indexmap::IndexMap;

#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("invalid header name '{name}'")]
    InvalidName {
        name: String,
        #[source]
        source: InvalidHeaderName,
    },
    #[error("invalid value for header '{name}'")]
    InvalidValue {
        name: String,
        #[source]
        source: InvalidHeaderValue,
    },
}

/// Ordered set of request headers. Names are case-insensitive; a name may
/// carry several values, kept in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: IndexMap<HeaderName, Vec<HeaderValue>>,
}

fn parse(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), HeaderError> {
    let header_name =
        HeaderName::try_from(name).map_err(|source| HeaderError::InvalidName {
            name: name.to_string(),
            source,
        })?;
    let header_value =
        HeaderValue::try_from(value).map_err(|source| HeaderError::InvalidValue {
            name: name.to_string(),
            source,
        })?;
    Ok((header_name, header_value))
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value for `name`, keeping values already present.
    pub fn add(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        let (name, value) = parse(name, value)?;
        self.entries.entry(name).or_default().push(value);
        Ok(())
    }

    /// Removes all values of `name`; returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        match HeaderName::try_from(name) {
            Ok(name) => self.entries.shift_remove(&name).is_some(),
            Err(_) => false,
        }
    }

    /// Replaces all values of `name` by `value`. A replaced header keeps its
    /// position; a new one is appended.
    pub fn replace(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        let (name, value) = parse(name, value)?;
        self.entries.insert(name, vec![value]);
        Ok(())
    }

    /// First value of `name` as a string, if it is valid UTF-8.
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = HeaderName::try_from(name).ok()?;
        self.entries
            .get(&name)
            .and_then(|values| values.first())
            .and_then(|v| v.to_str().ok())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        HeaderName::try_from(name)
            .ok()
            .and_then(|name| self.entries.get(&name))
            .map(|values| values.iter().filter_map(|v| v.to_str().ok()).collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        HeaderName::try_from(name)
            .map(|name| self.entries.contains_key(&name))
            .unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name, v)))
    }

    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in self.iter() {
            map.append(name.clone(), value.clone());
        }
        map
    }
}

impl From<&HeaderMap> for HeaderSet {
    fn from(map: &HeaderMap) -> Self {
        let mut entries: IndexMap<HeaderName, Vec<HeaderValue>> = IndexMap::new();
        for (name, value) in map {
            entries.entry(name.clone()).or_default().push(value.clone());
        }
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_add_replace_remove() -> Result<(), HeaderError> {
        let mut h = HeaderSet::new();
        h.add("Accept", "application/json")?;
        h.add("X-Requested-With", "XMLHttpRequest")?;
        h.add("accept", "text/plain")?;
        assert_eq!(h.get_all("ACCEPT"), vec!["application/json", "text/plain"]);
        assert_eq!(h.len(), 2);

        h.replace("Accept", "application/xml")?;
        assert_eq!(h.get_all("accept"), vec!["application/xml"]);
        let names: Vec<_> = h.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["accept", "x-requested-with"]);

        assert!(h.remove("x-requested-with"));
        assert!(!h.remove("x-requested-with"));
        assert!(!h.contains("X-Requested-With"));
        Ok(())
    }

    #[test]
    fn test_invalid_header() {
        let mut h = HeaderSet::new();
        assert!(matches!(
            h.add("bad header", "x"),
            Err(HeaderError::InvalidName { .. })
        ));
        assert!(matches!(
            h.add("Authorization", "token\nabc"),
            Err(HeaderError::InvalidValue { .. })
        ));
        assert!(h.is_empty());
    }

    #[test]
    fn test_header_map_round_trip() -> Result<(), HeaderError> {
        let mut h = HeaderSet::new();
        h.add("Content-Type", "application/json")?;
        h.add("Set-Cookie", "a=1")?;
        h.add("Set-Cookie", "b=2")?;
        let map = h.to_header_map();
        assert_eq!(map.get_all("set-cookie").iter().count(), 2);
        assert_eq!(HeaderSet::from(&map), h);
        Ok(())
    }
}
