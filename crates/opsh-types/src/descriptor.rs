//! Resolved runtime type descriptors.

use std::fmt;

/// A concrete runtime type, either a scalar named type or an N-dimensional
/// array of an element type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Scalar {
        /// Fully qualified name, e.g. `System.Int32`.
        name: String,
    },
    Array {
        element: Box<TypeDescriptor>,
        /// Array rank; 1 is a plain vector, 2 a two-dimensional array.
        dimensions: usize,
    },
}

impl TypeDescriptor {
    /// A scalar descriptor with the given full name.
    pub fn scalar(name: impl Into<String>) -> Self {
        TypeDescriptor::Scalar { name: name.into() }
    }

    /// Wrap an element descriptor into an array of the given rank.
    pub fn array(element: TypeDescriptor, dimensions: usize) -> Self {
        TypeDescriptor::Array {
            element: Box::new(element),
            dimensions,
        }
    }

    /// Fully qualified display name, e.g. `System.Int32[,]` for rank 2.
    pub fn full_name(&self) -> String {
        match self {
            TypeDescriptor::Scalar { name } => name.clone(),
            TypeDescriptor::Array {
                element,
                dimensions,
            } => {
                let commas = ",".repeat(dimensions.saturating_sub(1));
                format!("{}[{}]", element.full_name(), commas)
            }
        }
    }

    /// Unqualified name: the last dot-separated segment of the full name.
    pub fn short_name(&self) -> String {
        let full = self.full_name();
        full.rsplit('.').next().unwrap_or(&full).to_string()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_full_name() {
        assert_eq!(TypeDescriptor::scalar("System.Int32").full_name(), "System.Int32");
    }

    #[test]
    fn array_full_name_uses_rank_commas() {
        let int = TypeDescriptor::scalar("System.Int32");
        assert_eq!(TypeDescriptor::array(int.clone(), 1).full_name(), "System.Int32[]");
        assert_eq!(TypeDescriptor::array(int, 2).full_name(), "System.Int32[,]");
    }

    #[test]
    fn short_name_drops_namespace() {
        assert_eq!(TypeDescriptor::scalar("System.Net.IPAddress").short_name(), "IPAddress");
    }
}
