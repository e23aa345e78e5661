use std::fmt;

/// The request method reported by the transport environment.
///
/// The raw `REQUEST_METHOD` value is mapped leniently: anything this enum
/// does not know is treated as GET rather than rejected, so method
/// resolution can never fail a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

impl Method {
    /// Maps a raw `REQUEST_METHOD` value, defaulting to GET.
    pub fn from_param(raw: &str) -> Self {
        match raw {
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "PATCH" => Self::Patch,
            _ => Self::Get,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
        }
    }

    /// Whether a declared body is read from the session's input stream for
    /// this method. Requests with no method-appropriate body never touch the
    /// body stream.
    pub fn reads_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_methods() {
        assert_eq!(Method::from_param("GET"), Method::Get);
        assert_eq!(Method::from_param("POST"), Method::Post);
        assert_eq!(Method::from_param("PUT"), Method::Put);
        assert_eq!(Method::from_param("DELETE"), Method::Delete);
    }

    #[test]
    fn unknown_methods_default_to_get() {
        assert_eq!(Method::from_param(""), Method::Get);
        assert_eq!(Method::from_param("get"), Method::Get);
        assert_eq!(Method::from_param("BREW"), Method::Get);
    }

    #[test]
    fn only_post_and_put_read_a_body() {
        assert!(Method::Post.reads_body());
        assert!(Method::Put.reads_body());
        assert!(!Method::Get.reads_body());
        assert!(!Method::Delete.reads_body());
        assert!(!Method::Head.reads_body());
    }
}
