/// Calculate the score for one hole.
///
/// Scoring rules:
/// - Under par: +2 per stroke under
/// - At par: +1
/// - Over par: 0
/// - DNF (did not finish): -1
///
/// `strokes` includes penalty strokes.
pub fn calculate_score(strokes: u32, par: u8, finished: bool) -> i32 {
    if !finished {
        return -1;
    }

    let par = par as i32;
    let strokes = strokes.min(i32::MAX as u32) as i32;

    if strokes < par {
        (par - strokes) * 2
    } else if strokes == par {
        1
    } else {
        0
    }
}

/// Conventional name for a stroke count relative to par.
pub fn score_name(strokes: u32, par: u8) -> &'static str {
    if strokes == 1 {
        return "hole in one";
    }
    match strokes as i64 - par as i64 {
        ..=-3 => "albatross",
        -2 => "eagle",
        -1 => "birdie",
        0 => "par",
        1 => "bogey",
        2 => "double bogey",
        _ => "over par",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn under_par() {
        // Par 3, 2 strokes: (3-2)*2 = 2
        assert_eq!(calculate_score(2, 3, true), 2);
    }

    #[test]
    fn at_par() {
        assert_eq!(calculate_score(3, 3, true), 1);
    }

    #[test]
    fn over_par() {
        assert_eq!(calculate_score(5, 3, true), 0);
    }

    #[test]
    fn dnf() {
        assert_eq!(calculate_score(0, 3, false), -1);
        assert_eq!(calculate_score(7, 3, false), -1);
    }

    #[test]
    fn hole_in_one() {
        // Par 3, 1 stroke: (3-1)*2 = 4
        assert_eq!(calculate_score(1, 3, true), 4);
        assert_eq!(score_name(1, 3), "hole in one");
    }

    #[test]
    fn names_relative_to_par() {
        assert_eq!(score_name(2, 4), "eagle");
        assert_eq!(score_name(3, 4), "birdie");
        assert_eq!(score_name(4, 4), "par");
        assert_eq!(score_name(5, 4), "bogey");
        assert_eq!(score_name(6, 4), "double bogey");
        assert_eq!(score_name(9, 4), "over par");
        assert_eq!(score_name(2, 5), "albatross");
    }
}
