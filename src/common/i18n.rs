// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

pub const DEFAULT_LANG: &str = "id";
const FALLBACK_LANG: &str = "en";

// Catálogos embutidos no binário, um por idioma
const CATALOGS: [(&str, &str); 2] = [
    ("id", include_str!("../../locales/id.json")),
    ("en", include_str!("../../locales/en.json")),
];

pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();

        for (lang, raw) in CATALOGS {
            let catalog: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Catálogo de idioma inválido: {lang}"))?;
            catalogs.insert(lang.to_string(), catalog);
        }

        Ok(Self { catalogs })
    }

    /// Busca a mensagem no idioma pedido, depois no padrão e por fim em inglês.
    /// Se nenhum catálogo conhece o código, devolve o próprio código.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        [lang, DEFAULT_LANG, FALLBACK_LANG]
            .iter()
            .find_map(|l| self.catalogs.get(*l).and_then(|catalog| catalog.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_falls_back_to_default() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("fr", "customer_not_found"), "Customer tidak ditemukan.");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("en", "no_such_key"), "no_such_key");
    }

    #[test]
    fn catalogs_share_the_same_keys() {
        let store = I18nStore::load().unwrap();
        let id = &store.catalogs["id"];
        let en = &store.catalogs["en"];

        for key in id.keys() {
            assert!(en.contains_key(key), "chave '{key}' falta no catálogo en");
        }
        assert_eq!(id.len(), en.len());
    }
}
