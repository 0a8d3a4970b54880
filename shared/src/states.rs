use serde::{Deserialize, Serialize};

/// One entry of the fixed US state/territory reference table.
///
/// `id` is the numeric FIPS code used to key the geographic boundary data;
/// `code` is the two-letter postal abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateRef {
    pub id: u32,
    pub code: &'static str,
    pub name: &'static str,
}

/// Which field of a [`StateRef`] (and of input records) acts as the
/// display key when matching datasets against the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyMode {
    Code,
    Name,
}

impl StateRef {
    /// The display key for this state under the given mode.
    pub const fn key(&self, mode: KeyMode) -> &'static str {
        match mode {
            KeyMode::Code => self.code,
            KeyMode::Name => self.name,
        }
    }
}

/// Look up a state by FIPS id. The table is sorted by id.
pub fn find_by_id(id: u32) -> Option<&'static StateRef> {
    STATES
        .binary_search_by_key(&id, |s| s.id)
        .ok()
        .map(|idx| &STATES[idx])
}

/// Canonical reference table: 50 states, DC, and the territories present
/// in the US boundary datasets. Sorted by FIPS id.
pub const STATES: &[StateRef] = &[
    StateRef { id: 1, code: "AL", name: "Alabama" },
    StateRef { id: 2, code: "AK", name: "Alaska" },
    StateRef { id: 4, code: "AZ", name: "Arizona" },
    StateRef { id: 5, code: "AR", name: "Arkansas" },
    StateRef { id: 6, code: "CA", name: "California" },
    StateRef { id: 8, code: "CO", name: "Colorado" },
    StateRef { id: 9, code: "CT", name: "Connecticut" },
    StateRef { id: 10, code: "DE", name: "Delaware" },
    StateRef { id: 11, code: "DC", name: "District of Columbia" },
    StateRef { id: 12, code: "FL", name: "Florida" },
    StateRef { id: 13, code: "GA", name: "Georgia" },
    StateRef { id: 15, code: "HI", name: "Hawaii" },
    StateRef { id: 16, code: "ID", name: "Idaho" },
    StateRef { id: 17, code: "IL", name: "Illinois" },
    StateRef { id: 18, code: "IN", name: "Indiana" },
    StateRef { id: 19, code: "IA", name: "Iowa" },
    StateRef { id: 20, code: "KS", name: "Kansas" },
    StateRef { id: 21, code: "KY", name: "Kentucky" },
    StateRef { id: 22, code: "LA", name: "Louisiana" },
    StateRef { id: 23, code: "ME", name: "Maine" },
    StateRef { id: 24, code: "MD", name: "Maryland" },
    StateRef { id: 25, code: "MA", name: "Massachusetts" },
    StateRef { id: 26, code: "MI", name: "Michigan" },
    StateRef { id: 27, code: "MN", name: "Minnesota" },
    StateRef { id: 28, code: "MS", name: "Mississippi" },
    StateRef { id: 29, code: "MO", name: "Missouri" },
    StateRef { id: 30, code: "MT", name: "Montana" },
    StateRef { id: 31, code: "NE", name: "Nebraska" },
    StateRef { id: 32, code: "NV", name: "Nevada" },
    StateRef { id: 33, code: "NH", name: "New Hampshire" },
    StateRef { id: 34, code: "NJ", name: "New Jersey" },
    StateRef { id: 35, code: "NM", name: "New Mexico" },
    StateRef { id: 36, code: "NY", name: "New York" },
    StateRef { id: 37, code: "NC", name: "North Carolina" },
    StateRef { id: 38, code: "ND", name: "North Dakota" },
    StateRef { id: 39, code: "OH", name: "Ohio" },
    StateRef { id: 40, code: "OK", name: "Oklahoma" },
    StateRef { id: 41, code: "OR", name: "Oregon" },
    StateRef { id: 42, code: "PA", name: "Pennsylvania" },
    StateRef { id: 44, code: "RI", name: "Rhode Island" },
    StateRef { id: 45, code: "SC", name: "South Carolina" },
    StateRef { id: 46, code: "SD", name: "South Dakota" },
    StateRef { id: 47, code: "TN", name: "Tennessee" },
    StateRef { id: 48, code: "TX", name: "Texas" },
    StateRef { id: 49, code: "UT", name: "Utah" },
    StateRef { id: 50, code: "VT", name: "Vermont" },
    StateRef { id: 51, code: "VA", name: "Virginia" },
    StateRef { id: 53, code: "WA", name: "Washington" },
    StateRef { id: 54, code: "WV", name: "West Virginia" },
    StateRef { id: 55, code: "WI", name: "Wisconsin" },
    StateRef { id: 56, code: "WY", name: "Wyoming" },
    StateRef { id: 60, code: "AS", name: "American Samoa" },
    StateRef { id: 64, code: "FM", name: "Federated States of Micronesia" },
    StateRef { id: 66, code: "GU", name: "Guam" },
    StateRef { id: 68, code: "MH", name: "Marshall Islands" },
    StateRef { id: 69, code: "MP", name: "Northern Mariana Islands" },
    StateRef { id: 70, code: "PW", name: "Palau" },
    StateRef { id: 72, code: "PR", name: "Puerto Rico" },
    StateRef { id: 74, code: "UM", name: "U.S. Minor Outlying Islands" },
    StateRef { id: 78, code: "VI", name: "Virgin Islands of the United States" },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_by_id() {
        assert!(STATES.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn find_by_id_hits_known_states() {
        assert_eq!(find_by_id(12).map(|s| s.code), Some("FL"));
        assert_eq!(find_by_id(6).map(|s| s.name), Some("California"));
        assert_eq!(find_by_id(78).map(|s| s.code), Some("VI"));
    }

    #[test]
    fn find_by_id_misses_unassigned_fips_gaps() {
        // 3, 7, 14, 43, 52 are unassigned FIPS codes
        for id in [0, 3, 7, 14, 43, 52, 99] {
            assert!(find_by_id(id).is_none(), "id {id} should be unassigned");
        }
    }

    #[test]
    fn key_follows_mode() {
        let fl = find_by_id(12).unwrap();
        assert_eq!(fl.key(KeyMode::Code), "FL");
        assert_eq!(fl.key(KeyMode::Name), "Florida");
    }
}
