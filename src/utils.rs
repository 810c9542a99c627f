/// Returns every item whose value equals the maximum, in iteration order.
///
/// NaN values never compare greater, so they only win when every value is NaN.
pub fn max_set<T, I>(items: I) -> Vec<T>
where
    I: IntoIterator<Item = (T, f64)>,
{
    let mut max: f64 = f64::NEG_INFINITY;
    let mut result: Vec<T> = vec![];
    let mut fallback: Vec<T> = vec![];
    for (item, value) in items {
        if value > max {
            max = value;
            result.clear();
            result.push(item);
        } else if value == max {
            result.push(item);
        } else if result.is_empty() {
            fallback.push(item);
        }
    }
    if result.is_empty() {
        fallback
    } else {
        result
    }
}

pub fn moving_average(window: usize, vector: &[f64]) -> Vec<f64> {
    let window: usize = window.max(1);
    vector
        .chunks(window)
        .map(|slice| slice.iter().sum::<f64>() / slice.len() as f64)
        .collect()
}
