use checkin::binning::{AgeRange, bin_age};

#[test]
fn test_age_boundaries() {
    // Each boundary age and the bucket it must land in
    let cases = [
        (17, "<18"),
        (18, "18-25"),
        (25, "18-25"),
        (26, "25-40"),
        (40, "25-40"),
        (41, ">40"),
    ];

    for (age, expected) in cases {
        assert_eq!(bin_age(age).label(), expected, "Wrong bucket for age {}", age);
    }
}

#[test]
fn test_implausible_ages_are_still_binned() {
    assert_eq!(bin_age(-5), AgeRange::Under18);
    assert_eq!(bin_age(0), AgeRange::Under18);
    assert_eq!(bin_age(130), AgeRange::Over40);
    assert_eq!(bin_age(i64::MAX), AgeRange::Over40);
}

#[test]
fn test_ranges_sort_youngest_first() {
    let mut ranges = vec![AgeRange::Over40, AgeRange::Under18, AgeRange::From26To40, AgeRange::From18To25];
    ranges.sort();
    assert_eq!(ranges, AgeRange::ALL.to_vec());
}

#[test]
fn test_label_parses_back() {
    for range in AgeRange::ALL {
        assert_eq!(range.label().parse::<AgeRange>(), Ok(range));
    }
    assert!("18-40".parse::<AgeRange>().is_err());
}
