// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::AssetId;

// Order matters: the first key contained in a label wins.
const BUILTIN_ICONS: &[(&str, &[&str])] = &[
    ("大井町線", &["OM.png", "OM_1.png"]),
    ("田園都市線", &["tokyurailway/icon_DT.png"]),
    ("東横線", &["tokyurailway/icon_TY.png"]),
    ("目黒線", &["tokyurailway/icon_MG.png"]),
    ("池上線", &["tokyurailway/icon_IK.png"]),
    ("多摩川線", &["tokyurailway/icon_TM.png"]),
    ("こどもの国線", &["tokyurailway/icon_KD.png"]),
    ("東急新横浜線", &["tokyurailway/icon_SH.png"]),
    ("東上線", &["tobu/icon_tojo.png"]),
    ("伊勢崎線", &["tobu/icon_isesaki.png"]),
    ("スカイツリーライン", &["tobu/icon_skytree.png"]),
    ("日光線", &["tobu/icon_nikko.png"]),
    ("アーバンパークライン", &["tobu/icon_urbanpark.png"]),
    ("玉11", &["tokyu_bus.png"]),
    ("園02", &["tokyu_bus.png"]),
    ("等01", &["tokyu_bus.png"]),
    ("丸の内線", &["tokyometro/icon_marunouchi.png"]),
    ("丸の内線方南町支線", &["tokyometro/icon_marunouchi.png"]),
    ("南北線", &["tokyometro/icon_namboku.png"]),
    ("東西線", &["tokyometro/icon_tozai.png"]),
    ("有楽町線", &["tokyometro/icon_yurakucho.png"]),
    ("千代田線", &["tokyometro/icon_chiyoda.png"]),
    ("副都心線", &["tokyometro/icon_fukutoshin.png"]),
    ("銀座線", &["tokyometro/icon_ginza.png"]),
    ("半蔵門線", &["tokyometro/icon_hanzomon.png"]),
    ("日比谷線", &["tokyometro/icon_hibiya.png"]),
    ("浅草線", &["toei/icon_asakusa.png"]),
    ("三田線", &["toei/icon_mita.png"]),
    ("新宿線", &["toei/icon_shinjuku.png"]),
    ("大江戸線", &["toei/icon_oedo.png"]),
    ("都電荒川線（東京さくらトラム）", &["toei/icon_arakawa.png"]),
    ("グリーンライン", &["yokohama/icon_green.png"]),
    ("ブルーライン", &["yokohama/icon_blue.png"]),
    ("多摩モノレール", &["icon_tamamonorail.png"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct IconEntry {
    key: String,
    assets: Vec<AssetId>,
}

/// Ordered label-to-icon table. Lookup is a first-match substring scan, so
/// when two keys both occur in a label the one defined earlier wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IconTable {
    entries: Vec<IconEntry>,
}

impl IconTable {
    pub fn new<I, K, F>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<F>)>,
        K: Into<String>,
        F: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, files)| IconEntry {
                    key: key.into(),
                    assets: files
                        .iter()
                        .map(|file| AssetId::from_file(file.as_ref()))
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_ICONS
                .iter()
                .map(|(key, files)| (*key, files.to_vec())),
        )
    }

    pub fn resolve(&self, label: &str) -> &[AssetId] {
        self.entries
            .iter()
            .find(|entry| !entry.key.is_empty() && label.contains(entry.key.as_str()))
            .map(|entry| entry.assets.as_slice())
            .unwrap_or(&[])
    }
}
