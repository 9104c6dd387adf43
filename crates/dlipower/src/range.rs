// Outlet range expressions: `1-3,17,19-20`.

/// Expand a comma-separated list of outlet numbers, ranges, and names.
///
/// A range `a-b` expands to every number from `a` to `b`, each zero-padded
/// to the width of `b` as written (`6-10` gives `06` .. `10`). Items that
/// are not numeric ranges pass through unchanged as outlet names.
pub fn expand_range(spec: &str) -> Vec<String> {
    spec.split(',')
        .filter(|item| !item.is_empty())
        .flat_map(expand_item)
        .collect()
}

/// Join command-line words with commas and expand them.
pub fn expand_args(args: &[String]) -> Vec<String> {
    expand_range(&args.join(","))
}

fn expand_item(item: &str) -> Vec<String> {
    let Some((low, high)) = item.split_once('-') else {
        return vec![item.to_owned()];
    };
    let (Ok(start), Ok(end)) = (low.trim().parse::<u32>(), high.trim().parse::<u32>()) else {
        return vec![item.to_owned()];
    };

    let width = high.trim().len();
    (start..=end).map(|n| format!("{n:0width$}")).collect()
}
