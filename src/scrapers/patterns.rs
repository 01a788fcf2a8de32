//! Expressions shared by the Dutch listing sites.

/// "€ 450.000 k.k.", "€ 1.250,- per maand", "€450.000 v.o.n."
pub const EURO_PRICE: &str =
    r"(€\s*\d[\d.]*(?:,[\d-]+)?(?:\s*(?:k\.k\.|v\.o\.n\.|kosten koper|vrij op naam|per maand|/\s*maand|/\s*mnd))?)";

pub const PRICE_ON_REQUEST: &str = r"(?i)\b(prijs op aanvraag|price on request)\b";

/// "90 m²", "90m2", "90,5 m²"
pub const AREA_M2: &str = r"(\d+(?:[.,]\d+)?\s*m[²2])";

/// "3 kamers", "1 kamer"
pub const ROOMS_NL: &str = r"(?i)\b(\d+\s*kamers?)\b";

pub const ROOMS_EN: &str = r"(?i)\b(\d+\s*rooms?)\b";
