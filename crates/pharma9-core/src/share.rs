//! Text payloads for sharing a pharmacy's details.

use serde::Serialize;

use crate::catalog::PharmacyRecord;

/// Structured payload for a native share sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

#[must_use]
pub fn share_payload(pharmacy: &PharmacyRecord, url: &str) -> SharePayload {
    SharePayload {
        title: pharmacy.name.clone(),
        text: format!(
            "Voici les informations pour la pharmacie {}: {}, Tél: {}.",
            pharmacy.name, pharmacy.address, pharmacy.phone
        ),
        url: url.to_string(),
    }
}

/// Plain-text block written to the clipboard when native sharing is unavailable.
#[must_use]
pub fn clipboard_text(pharmacy: &PharmacyRecord) -> String {
    format!(
        "Pharmacie: {}\nAdresse: {}\nTéléphone: {}",
        pharmacy.name, pharmacy.address, pharmacy.phone
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::pharmacy;

    #[test]
    fn payload_carries_name_address_and_phone() {
        let p = pharmacy(2, "Pharmacie Beta", "Medina");
        let payload = share_payload(&p, "https://pharma9.sn/");
        assert_eq!(payload.title, "Pharmacie Beta");
        assert_eq!(
            payload.text,
            "Voici les informations pour la pharmacie Pharmacie Beta: 2 Rue Test, Tél: +221 33 800 00 02."
        );
        assert_eq!(payload.url, "https://pharma9.sn/");
    }

    #[test]
    fn clipboard_block_is_three_lines() {
        let p = pharmacy(2, "Pharmacie Beta", "Medina");
        let text = clipboard_text(&p);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Pharmacie: Pharmacie Beta",
                "Adresse: 2 Rue Test",
                "Téléphone: +221 33 800 00 02"
            ]
        );
    }
}
