//! Country name to continent resolution.
//!
//! Resolution is total: anything that does not match a known country name,
//! alias or ISO 3166-1 alpha-2 code maps to [`Continent::Unknown`].

use std::collections::HashMap;

use crate::models::Continent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryEntry {
    pub code: &'static str,
    pub name: &'static str,
    pub continent: Continent,
}

const fn entry(code: &'static str, name: &'static str, continent: Continent) -> CountryEntry {
    CountryEntry {
        code,
        name,
        continent,
    }
}

use crate::models::Continent::{
    Africa, Antarctica, Asia, Europe, NorthAmerica, Oceania, SouthAmerica,
};

static COUNTRIES: &[CountryEntry] = &[
    // Africa
    entry("DZ", "Algeria", Africa),
    entry("AO", "Angola", Africa),
    entry("BJ", "Benin", Africa),
    entry("BW", "Botswana", Africa),
    entry("BF", "Burkina Faso", Africa),
    entry("BI", "Burundi", Africa),
    entry("CV", "Cabo Verde", Africa),
    entry("CM", "Cameroon", Africa),
    entry("CF", "Central African Republic", Africa),
    entry("TD", "Chad", Africa),
    entry("KM", "Comoros", Africa),
    entry("CG", "Congo", Africa),
    entry("CD", "Democratic Republic of the Congo", Africa),
    entry("CI", "Côte d'Ivoire", Africa),
    entry("DJ", "Djibouti", Africa),
    entry("EG", "Egypt", Africa),
    entry("GQ", "Equatorial Guinea", Africa),
    entry("ER", "Eritrea", Africa),
    entry("SZ", "Eswatini", Africa),
    entry("ET", "Ethiopia", Africa),
    entry("GA", "Gabon", Africa),
    entry("GM", "Gambia", Africa),
    entry("GH", "Ghana", Africa),
    entry("GN", "Guinea", Africa),
    entry("GW", "Guinea-Bissau", Africa),
    entry("KE", "Kenya", Africa),
    entry("LS", "Lesotho", Africa),
    entry("LR", "Liberia", Africa),
    entry("LY", "Libya", Africa),
    entry("MG", "Madagascar", Africa),
    entry("MW", "Malawi", Africa),
    entry("ML", "Mali", Africa),
    entry("MR", "Mauritania", Africa),
    entry("MU", "Mauritius", Africa),
    entry("YT", "Mayotte", Africa),
    entry("MA", "Morocco", Africa),
    entry("MZ", "Mozambique", Africa),
    entry("NA", "Namibia", Africa),
    entry("NE", "Niger", Africa),
    entry("NG", "Nigeria", Africa),
    entry("RE", "Réunion", Africa),
    entry("RW", "Rwanda", Africa),
    entry("SH", "Saint Helena", Africa),
    entry("ST", "Sao Tome and Principe", Africa),
    entry("SN", "Senegal", Africa),
    entry("SC", "Seychelles", Africa),
    entry("SL", "Sierra Leone", Africa),
    entry("SO", "Somalia", Africa),
    entry("ZA", "South Africa", Africa),
    entry("SS", "South Sudan", Africa),
    entry("SD", "Sudan", Africa),
    entry("TZ", "Tanzania", Africa),
    entry("TG", "Togo", Africa),
    entry("TN", "Tunisia", Africa),
    entry("UG", "Uganda", Africa),
    entry("EH", "Western Sahara", Africa),
    entry("ZM", "Zambia", Africa),
    entry("ZW", "Zimbabwe", Africa),
    // Antarctica
    entry("AQ", "Antarctica", Antarctica),
    entry("TF", "French Southern Territories", Antarctica),
    entry("GS", "South Georgia and the South Sandwich Islands", Antarctica),
    // Asia
    entry("AF", "Afghanistan", Asia),
    entry("AM", "Armenia", Asia),
    entry("AZ", "Azerbaijan", Asia),
    entry("BH", "Bahrain", Asia),
    entry("BD", "Bangladesh", Asia),
    entry("BT", "Bhutan", Asia),
    entry("BN", "Brunei Darussalam", Asia),
    entry("KH", "Cambodia", Asia),
    entry("CN", "China", Asia),
    entry("CY", "Cyprus", Asia),
    entry("GE", "Georgia", Asia),
    entry("HK", "Hong Kong", Asia),
    entry("IN", "India", Asia),
    entry("ID", "Indonesia", Asia),
    entry("IR", "Iran", Asia),
    entry("IQ", "Iraq", Asia),
    entry("IL", "Israel", Asia),
    entry("JP", "Japan", Asia),
    entry("JO", "Jordan", Asia),
    entry("KZ", "Kazakhstan", Asia),
    entry("KP", "North Korea", Asia),
    entry("KR", "South Korea", Asia),
    entry("KW", "Kuwait", Asia),
    entry("KG", "Kyrgyzstan", Asia),
    entry("LA", "Laos", Asia),
    entry("LB", "Lebanon", Asia),
    entry("MO", "Macao", Asia),
    entry("MY", "Malaysia", Asia),
    entry("MV", "Maldives", Asia),
    entry("MN", "Mongolia", Asia),
    entry("MM", "Myanmar", Asia),
    entry("NP", "Nepal", Asia),
    entry("OM", "Oman", Asia),
    entry("PK", "Pakistan", Asia),
    entry("PS", "Palestine", Asia),
    entry("PH", "Philippines", Asia),
    entry("QA", "Qatar", Asia),
    entry("SA", "Saudi Arabia", Asia),
    entry("SG", "Singapore", Asia),
    entry("LK", "Sri Lanka", Asia),
    entry("SY", "Syria", Asia),
    entry("TW", "Taiwan", Asia),
    entry("TJ", "Tajikistan", Asia),
    entry("TH", "Thailand", Asia),
    entry("TL", "Timor-Leste", Asia),
    entry("TR", "Turkey", Asia),
    entry("TM", "Turkmenistan", Asia),
    entry("AE", "United Arab Emirates", Asia),
    entry("UZ", "Uzbekistan", Asia),
    entry("VN", "Viet Nam", Asia),
    entry("YE", "Yemen", Asia),
    // Europe
    entry("AL", "Albania", Europe),
    entry("AD", "Andorra", Europe),
    entry("AT", "Austria", Europe),
    entry("BY", "Belarus", Europe),
    entry("BE", "Belgium", Europe),
    entry("BA", "Bosnia and Herzegovina", Europe),
    entry("BG", "Bulgaria", Europe),
    entry("HR", "Croatia", Europe),
    entry("CZ", "Czechia", Europe),
    entry("DK", "Denmark", Europe),
    entry("EE", "Estonia", Europe),
    entry("FO", "Faroe Islands", Europe),
    entry("FI", "Finland", Europe),
    entry("FR", "France", Europe),
    entry("DE", "Germany", Europe),
    entry("GI", "Gibraltar", Europe),
    entry("GR", "Greece", Europe),
    entry("VA", "Holy See", Europe),
    entry("HU", "Hungary", Europe),
    entry("IS", "Iceland", Europe),
    entry("IE", "Ireland", Europe),
    entry("IT", "Italy", Europe),
    entry("XK", "Kosovo", Europe),
    entry("LV", "Latvia", Europe),
    entry("LI", "Liechtenstein", Europe),
    entry("LT", "Lithuania", Europe),
    entry("LU", "Luxembourg", Europe),
    entry("MT", "Malta", Europe),
    entry("MD", "Moldova", Europe),
    entry("MC", "Monaco", Europe),
    entry("ME", "Montenegro", Europe),
    entry("NL", "Netherlands", Europe),
    entry("MK", "North Macedonia", Europe),
    entry("NO", "Norway", Europe),
    entry("PL", "Poland", Europe),
    entry("PT", "Portugal", Europe),
    entry("RO", "Romania", Europe),
    entry("RU", "Russia", Europe),
    entry("SM", "San Marino", Europe),
    entry("RS", "Serbia", Europe),
    entry("SK", "Slovakia", Europe),
    entry("SI", "Slovenia", Europe),
    entry("ES", "Spain", Europe),
    entry("SE", "Sweden", Europe),
    entry("CH", "Switzerland", Europe),
    entry("UA", "Ukraine", Europe),
    entry("GB", "United Kingdom", Europe),
    // North America
    entry("AG", "Antigua and Barbuda", NorthAmerica),
    entry("AW", "Aruba", NorthAmerica),
    entry("BS", "Bahamas", NorthAmerica),
    entry("BB", "Barbados", NorthAmerica),
    entry("BZ", "Belize", NorthAmerica),
    entry("BM", "Bermuda", NorthAmerica),
    entry("CA", "Canada", NorthAmerica),
    entry("KY", "Cayman Islands", NorthAmerica),
    entry("CR", "Costa Rica", NorthAmerica),
    entry("CU", "Cuba", NorthAmerica),
    entry("CW", "Curaçao", NorthAmerica),
    entry("DM", "Dominica", NorthAmerica),
    entry("DO", "Dominican Republic", NorthAmerica),
    entry("SV", "El Salvador", NorthAmerica),
    entry("GL", "Greenland", NorthAmerica),
    entry("GD", "Grenada", NorthAmerica),
    entry("GP", "Guadeloupe", NorthAmerica),
    entry("GT", "Guatemala", NorthAmerica),
    entry("HT", "Haiti", NorthAmerica),
    entry("HN", "Honduras", NorthAmerica),
    entry("JM", "Jamaica", NorthAmerica),
    entry("MQ", "Martinique", NorthAmerica),
    entry("MX", "Mexico", NorthAmerica),
    entry("NI", "Nicaragua", NorthAmerica),
    entry("PA", "Panama", NorthAmerica),
    entry("PR", "Puerto Rico", NorthAmerica),
    entry("KN", "Saint Kitts and Nevis", NorthAmerica),
    entry("LC", "Saint Lucia", NorthAmerica),
    entry("VC", "Saint Vincent and the Grenadines", NorthAmerica),
    entry("TT", "Trinidad and Tobago", NorthAmerica),
    entry("US", "United States of America", NorthAmerica),
    // Oceania
    entry("AS", "American Samoa", Oceania),
    entry("AU", "Australia", Oceania),
    entry("FJ", "Fiji", Oceania),
    entry("PF", "French Polynesia", Oceania),
    entry("GU", "Guam", Oceania),
    entry("KI", "Kiribati", Oceania),
    entry("MH", "Marshall Islands", Oceania),
    entry("FM", "Micronesia", Oceania),
    entry("NR", "Nauru", Oceania),
    entry("NC", "New Caledonia", Oceania),
    entry("NZ", "New Zealand", Oceania),
    entry("PW", "Palau", Oceania),
    entry("PG", "Papua New Guinea", Oceania),
    entry("WS", "Samoa", Oceania),
    entry("SB", "Solomon Islands", Oceania),
    entry("TO", "Tonga", Oceania),
    entry("TV", "Tuvalu", Oceania),
    entry("VU", "Vanuatu", Oceania),
    // South America
    entry("AR", "Argentina", SouthAmerica),
    entry("BO", "Bolivia", SouthAmerica),
    entry("BR", "Brazil", SouthAmerica),
    entry("CL", "Chile", SouthAmerica),
    entry("CO", "Colombia", SouthAmerica),
    entry("EC", "Ecuador", SouthAmerica),
    entry("FK", "Falkland Islands", SouthAmerica),
    entry("GF", "French Guiana", SouthAmerica),
    entry("GY", "Guyana", SouthAmerica),
    entry("PY", "Paraguay", SouthAmerica),
    entry("PE", "Peru", SouthAmerica),
    entry("SR", "Suriname", SouthAmerica),
    entry("UY", "Uruguay", SouthAmerica),
    entry("VE", "Venezuela", SouthAmerica),
];

/// Alternative spellings mapped to ISO alpha-2 codes.
static ALIASES: &[(&str, &str)] = &[
    ("united states", "US"),
    ("usa", "US"),
    ("u.s.a.", "US"),
    ("united kingdom of great britain and northern ireland", "GB"),
    ("uk", "GB"),
    ("great britain", "GB"),
    ("england", "GB"),
    ("scotland", "GB"),
    ("wales", "GB"),
    ("northern ireland", "GB"),
    ("russian federation", "RU"),
    ("korea, republic of", "KR"),
    ("republic of korea", "KR"),
    ("korea", "KR"),
    ("korea, democratic people's republic of", "KP"),
    ("democratic people's republic of korea", "KP"),
    ("vietnam", "VN"),
    ("iran, islamic republic of", "IR"),
    ("syrian arab republic", "SY"),
    ("lao people's democratic republic", "LA"),
    ("bolivia, plurinational state of", "BO"),
    ("venezuela, bolivarian republic of", "VE"),
    ("tanzania, united republic of", "TZ"),
    ("united republic of tanzania", "TZ"),
    ("moldova, republic of", "MD"),
    ("republic of moldova", "MD"),
    ("czech republic", "CZ"),
    ("ivory coast", "CI"),
    ("cote d'ivoire", "CI"),
    ("democratic republic of congo", "CD"),
    ("congo, the democratic republic of the", "CD"),
    ("dr congo", "CD"),
    ("congo (kinshasa)", "CD"),
    ("congo (brazzaville)", "CG"),
    ("republic of the congo", "CG"),
    ("macedonia", "MK"),
    ("swaziland", "SZ"),
    ("burma", "MM"),
    ("vatican city", "VA"),
    ("vatican", "VA"),
    ("palestinian territory", "PS"),
    ("palestine, state of", "PS"),
    ("state of palestine", "PS"),
    ("brunei", "BN"),
    ("cape verde", "CV"),
    ("east timor", "TL"),
    ("micronesia, federated states of", "FM"),
    ("türkiye", "TR"),
    ("turkiye", "TR"),
    ("the netherlands", "NL"),
    ("holland", "NL"),
    ("the bahamas", "BS"),
    ("bahamas, the", "BS"),
    ("the gambia", "GM"),
    ("gambia, the", "GM"),
    ("st lucia", "LC"),
    ("saint vincent", "VC"),
    ("st kitts and nevis", "KN"),
    ("taiwan, province of china", "TW"),
    ("hong kong sar", "HK"),
    ("macau", "MO"),
    ("bosnia", "BA"),
    ("sao tome & principe", "ST"),
    ("trinidad & tobago", "TT"),
    ("antigua & barbuda", "AG"),
    ("uae", "AE"),
    ("reunion", "RE"),
    ("curacao", "CW"),
];

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\u{2019}', "'")
        .to_lowercase()
}

/// Look up a country by ISO 3166-1 alpha-2 code (case-insensitive).
pub fn country_by_code(code: &str) -> Option<&'static CountryEntry> {
    let code = code.trim();
    if code.len() != 2 {
        return None;
    }
    COUNTRIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Look up a country by canonical name, alias or alpha-2 code.
pub fn lookup_country(country: &str) -> Option<&'static CountryEntry> {
    let trimmed = country.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return country_by_code(trimmed);
    }

    let wanted = normalize(trimmed);
    COUNTRIES
        .iter()
        .find(|c| c.name.to_lowercase() == wanted)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == wanted)
                .and_then(|(_, code)| country_by_code(code))
        })
}

pub fn resolve_continent(country: &str) -> Continent {
    lookup_country(country)
        .map(|c| c.continent)
        .unwrap_or(Continent::Unknown)
}

/// Memoizes [`resolve_continent`] so bulk loads resolve each distinct country once.
#[derive(Debug, Default)]
pub struct ContinentResolver {
    resolved: HashMap<String, Continent>,
}

impl ContinentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, country: &str) -> Continent {
        if let Some(continent) = self.resolved.get(country) {
            return *continent;
        }
        let continent = resolve_continent(country);
        self.resolved.insert(country.to_string(), continent);
        continent
    }

    pub fn distinct_countries(&self) -> usize {
        self.resolved.len()
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.resolved
            .iter()
            .filter(|(_, continent)| !continent.is_known())
            .map(|(country, _)| country.as_str())
    }
}
