use crate::error::{GenerationError, Result};

/// Split `items` into consecutive groups of at most `size`, keeping order.
pub fn chunk<T: Clone>(items: &[T], size: usize) -> Result<Vec<Vec<T>>> {
    if size == 0 {
        return Err(GenerationError::InvalidArgument(
            "chunk size must be positive".to_string(),
        ));
    }
    Ok(items.chunks(size).map(<[T]>::to_vec).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uneven_tail() {
        assert_eq!(
            chunk(&[1, 2, 3, 4, 5], 2).unwrap(),
            vec![vec![1, 2], vec![3, 4], vec![5]]
        );
    }

    #[test]
    fn empty_input() {
        assert!(chunk::<i32>(&[], 2).unwrap().is_empty());
    }

    #[test]
    fn zero_size_rejected() {
        assert!(matches!(
            chunk(&[1, 2, 3], 0),
            Err(GenerationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn twelve_classes_in_parts_of_six() {
        let classes: Vec<usize> = (1..=12).collect();
        let parts = chunk(&classes, 6).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].first(), Some(&7));
        assert_eq!(parts.concat(), classes);
    }
}
