//! Explicit shape descriptor for checkpoint tensors.

use std::fmt;

/// Ordered list of dimension sizes, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape(Vec<usize>);

impl Shape {
    pub fn new(dims: impl Into<Vec<usize>>) -> Self {
        Self(dims.into())
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    pub fn dim(&self, axis: usize) -> Option<usize> {
        self.0.get(axis).copied()
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.0.iter().product()
    }

    /// `(rows, cols)` for rank-2 shapes, `None` otherwise.
    pub fn as_2d(&self) -> Option<(usize, usize)> {
        match self.0.as_slice() {
            [rows, cols] => Some((*rows, *cols)),
            _ => None,
        }
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self(dims.to_vec())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_2d() {
        assert_eq!(Shape::from([4, 8]).as_2d(), Some((4, 8)));
        assert_eq!(Shape::from([4]).as_2d(), None);
        assert_eq!(Shape::from([2, 3, 4]).as_2d(), None);
    }

    #[test]
    fn test_numel_and_display() {
        let shape = Shape::from([2, 3, 4]);
        assert_eq!(shape.numel(), 24);
        assert_eq!(shape.rank(), 3);
        assert_eq!(shape.dim(1), Some(3));
        assert_eq!(shape.dim(3), None);
        assert_eq!(shape.to_string(), "[2, 3, 4]");
    }

    #[test]
    fn test_scalar_shape() {
        let shape = Shape::default();
        assert_eq!(shape.rank(), 0);
        assert_eq!(shape.numel(), 1);
    }
}
