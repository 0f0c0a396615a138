use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Package {
    pub id: &'static str,
    pub name: &'static str,
    pub price: f64,
    pub duration: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub popular: bool,
    pub features: &'static [&'static str],
}

pub const CATALOG: [Package; 4] = [
    Package {
        id: "1h",
        name: "1 Hour",
        price: 10.00,
        duration: "1 hour",
        popular: false,
        features: &["High-speed connection", "Unlimited access", "Pay via Wave"],
    },
    Package {
        id: "24h",
        name: "24 Hours",
        price: 25.00,
        duration: "24 hours",
        popular: true,
        features: &["High-speed connection", "Full day access", "Pay via Wave", "Best value!"],
    },
    Package {
        id: "1w",
        name: "1 Week",
        price: 100.00,
        duration: "7 days",
        popular: false,
        features: &["High-speed connection", "7 days unlimited", "Pay via Wave", "Save 40%"],
    },
    Package {
        id: "1m",
        name: "1 Month",
        price: 350.00,
        duration: "30 days",
        popular: false,
        features: &[
            "High-speed connection",
            "30 days unlimited",
            "Pay via Wave",
            "Priority support",
            "Save 50%",
        ],
    },
];

pub fn find_package(package_type: &str) -> Option<&'static Package> {
    CATALOG
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(package_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(find_package("24H").map(|p| p.name), Some("24 Hours"));
        assert!(find_package("2y").is_none());
    }

    #[test]
    fn only_popular_package_carries_flag() {
        let value = serde_json::to_value(&CATALOG).unwrap();
        assert_eq!(value[1]["popular"], true);
        assert!(value[0].get("popular").is_none());
    }
}
