/// Index of the largest score, lowest index on ties. NaN never wins.
pub fn simple_argmax(input: &[f32]) -> Option<usize> {
    if input.is_empty() {
        return None;
    }
    let (index, _) = input.iter().enumerate().fold(
        (0, f32::NEG_INFINITY),
        |(best_index, best_value), (index, &value)| {
            if value > best_value {
                (index, value)
            } else {
                (best_index, best_value)
            }
        },
    );
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_picks_maximum() {
        assert_eq!(simple_argmax(&[1.0, 3.0, 2.0, 0.5]), Some(1));
        assert_eq!(simple_argmax(&[0.1, 0.5, 2.5, 1.0]), Some(2));
    }

    #[test]
    fn test_argmax_ties_resolve_to_lowest_index() {
        assert_eq!(simple_argmax(&[0.0, 4.0, 4.0, 4.0]), Some(1));
    }

    #[test]
    fn test_argmax_ignores_nan() {
        assert_eq!(simple_argmax(&[f32::NAN, -1.0, f32::NAN]), Some(1));
    }

    #[test]
    fn test_argmax_empty() {
        assert_eq!(simple_argmax(&[]), None);
    }
}
