//! Aspect ratio labels to Titan pixel dimensions.
//!
//! Titan rejects sizes that are not multiples of 64 or fall outside
//! [512, 2048], so every entry is chosen to satisfy both.

pub const DEFAULT_DIMENSIONS: (u32, u32) = (1024, 1024);

pub const TITAN_DIMENSIONS: &[(&str, (u32, u32))] = &[
    ("1:1", (1024, 1024)),
    ("768", (768, 768)),
    ("16:9", (1152, 640)),
    ("9:16", (640, 1152)),
    ("2:3", (768, 1152)),
    ("3:2", (1152, 768)),
    ("3:5", (768, 1280)),
    ("5:3", (1280, 768)),
    ("7:9", (896, 1152)),
    ("9:7", (1152, 896)),
    ("6:11", (768, 1408)),
    ("11:6", (1408, 768)),
    ("5:11", (640, 1408)),
    ("11:5", (1408, 640)),
    ("9:5", (1152, 640)),
    ("16:9_wide", (1152, 640)),
    ("16:9_tall", (640, 1152)),
];

pub fn lookup(label: &str) -> Option<(u32, u32)> {
    TITAN_DIMENSIONS
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, dims)| *dims)
}

/// Total: unknown labels resolve to 1024x1024.
pub fn titan_dimensions(label: &str) -> (u32, u32) {
    lookup(label).unwrap_or(DEFAULT_DIMENSIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(side: u32) -> bool {
        side % 64 == 0 && (512..=2048).contains(&side)
    }

    #[test]
    fn every_entry_is_a_valid_titan_size() {
        for (label, (width, height)) in TITAN_DIMENSIONS {
            assert!(valid(*width), "{} width {}", label, width);
            assert!(valid(*height), "{} height {}", label, height);
        }
        assert!(valid(DEFAULT_DIMENSIONS.0) && valid(DEFAULT_DIMENSIONS.1));
    }

    #[test]
    fn labels_are_unique() {
        for (i, (label, _)) in TITAN_DIMENSIONS.iter().enumerate() {
            assert!(TITAN_DIMENSIONS[i + 1..].iter().all(|(other, _)| other != label));
        }
    }

    #[test]
    fn known_labels() {
        assert_eq!(titan_dimensions("16:9"), (1152, 640));
        assert_eq!(titan_dimensions("9:16"), (640, 1152));
        assert_eq!(titan_dimensions("7:9"), (896, 1152));
    }

    #[test]
    fn unknown_labels_fall_back() {
        for label in ["4:3", "", "1:1 ", "banana", "21:9"] {
            assert_eq!(titan_dimensions(label), (1024, 1024));
        }
    }
}
