//! Query construction for the dashboard views: standing domain
//! allow-list, per-sector keyword tables and the query strings built
//! from a year plus a sector or district selection.

/// News source allow-list passed to the archive as a site restriction.
pub const NEWS_DOMAINS: &[&str] = &[
    "http://publico.pt/",
    "http://www.rtp.pt/",
    "http://expresso.pt/",
    "http://observador.pt/",
    "http://jornaldenegocios.pt/",
    "http://dn.pt/",
    "http://dn.sapo.pt/",
    "http://www.dn.pt/",
    "http://news.google.pt/",
    "http://dgo.pt/",
    "http://dgo.gov.pt/",
    "http://www.dgo.pt/",
    "http://www.portugal.gov.pt/",
    "https://www.dnoticias.pt/",
    "https://dnoticias.pt/",
    "https://www.jn.pt/",
    "https://jn.sapo.pt/",
    "https://sicnoticias.pt/",
    "https://www.rtp.pt/noticias/",
    "https://tvi24.iol.pt/",
    "https://www.sabado.pt/",
    "https://www.banca-financas.com/",
    "https://jornaleconomico.sapo.pt/",
];

const SECTOR_NAMES: &[(&str, &str)] = &[
    ("education", "Educação"),
    ("healthcare", "Saúde"),
    ("social-security", "Segurança Social"),
    ("infrastructure", "Infraestruturas"),
    ("defense", "Defesa"),
    ("justice", "Justiça"),
    ("environment", "Ambiente"),
    ("culture", "Cultura"),
    ("finance", "Finanças"),
    ("economy", "Economia"),
    ("agriculture", "Agricultura"),
    ("science", "Ciência e Tecnologia"),
    ("external", "Representação Externa"),
    ("governance", "Governação"),
    ("housing", "Habitação"),
    ("sea", "Mar"),
    ("tourism", "Turismo"),
    ("public_debt", "Gestão da Dívida Pública"),
    ("security", "Segurança Interna"),
];

const SECTOR_KEYWORDS: &[(&str, &[&str])] = &[
    ("education", &["educação", "ensino", "escola", "universidade", "estudantes"]),
    ("healthcare", &["saúde", "hospitais", "médicos", "enfermeiros", "sns"]),
    ("social-security", &["segurança social", "pensões", "reformas", "apoios sociais"]),
    ("infrastructure", &["infraestrutura", "transportes", "estradas", "ferrovia", "obras públicas"]),
    ("defense", &["defesa", "forças armadas", "militares", "exército", "marinha"]),
    ("justice", &["justiça", "tribunais", "magistrados", "sistema judicial"]),
    ("environment", &["ambiente", "clima", "sustentabilidade", "poluição", "energias renováveis"]),
    ("culture", &["cultura", "artes", "património", "museus", "espetáculos"]),
    ("finance", &["finanças", "impostos", "receitas", "despesas", "orçamento"]),
    ("economy", &["economia", "empresas", "indústria", "turismo", "competitividade"]),
    ("agriculture", &["agricultura", "desenvolvimento rural", "pescas", "produção agrícola"]),
    ("science", &["ciência", "tecnologia", "investigação", "inovação", "ensino superior"]),
    ("external", &["negócios estrangeiros", "diplomacia", "embaixadas", "cooperação externa"]),
    ("governance", &["governação", "administração pública", "modernização", "simplificação"]),
    ("housing", &["habitação", "arrendamento", "construção", "reabilitação urbana"]),
    ("sea", &["mar", "recursos marítimos", "portos", "pesca", "economia do mar"]),
    ("tourism", &["turismo", "hotelaria", "restauração", "património", "promoção turística"]),
    ("public_debt", &["dívida pública", "juros", "amortização", "gestão da dívida"]),
    ("security", &["segurança interna", "polícia", "proteção civil", "bombeiros"]),
];

pub fn default_news_domains() -> Vec<String> {
    NEWS_DOMAINS.iter().map(|d| d.to_string()).collect()
}

/// Portuguese display name of a sector id; unknown ids are used verbatim.
pub fn sector_display_name(sector: &str) -> &str {
    SECTOR_NAMES
        .iter()
        .find(|(id, _)| *id == sector)
        .map(|(_, name)| *name)
        .unwrap_or(sector)
}

/// Search keywords associated with a sector id, empty for unknown ids.
pub fn sector_keywords(sector: &str) -> &'static [&'static str] {
    SECTOR_KEYWORDS
        .iter()
        .find(|(id, _)| *id == sector)
        .map(|(_, keywords)| *keywords)
        .unwrap_or(&[])
}

/// Year-wide queries used when no sector or district is selected.
pub fn general_queries(year: i32) -> Vec<String> {
    [
        "orçamento estado",
        "execução orçamental",
        "despesa pública",
        "orçamento geral",
        "OE",
        "lei orçamento",
        "relatório orçamento",
        "debate orçamento",
        "aprovação orçamento",
        "ministro finanças orçamento",
        "programa orçamental",
        "medidas orçamentais",
        "receitas estado",
        "défice orçamental",
        "discussão orçamento",
    ]
    .iter()
    .map(|prefix| format!("{prefix} {year}"))
    .collect()
}

/// Queries for a sector view: three base forms on the sector's display
/// name plus an orçamento/despesa pair per sector keyword.
pub fn sector_queries(sector: &str, year: i32) -> Vec<String> {
    let name = sector_display_name(sector);
    let mut queries = vec![
        format!("orçamento {name} {year}"),
        format!("despesa {name} {year}"),
        format!("{name} orçamento estado {year}"),
    ];
    for keyword in sector_keywords(sector) {
        queries.push(format!("orçamento {keyword} {year}"));
        queries.push(format!("despesa {keyword} {year}"));
    }
    queries
}

/// Display name of a district. The map layer uses upper-cased ids for
/// the island regions; those are normalized, everything else is used
/// verbatim.
pub fn district_display_name(district: &str) -> &str {
    match district {
        "MADEIRA" => "Madeira",
        "AÇORES" => "Açores",
        other => other,
    }
}

/// Queries for a district view.
pub fn district_queries(district: &str, year: i32) -> Vec<String> {
    let district = district_display_name(district);
    vec![
        format!("orçamento {district} {year}"),
        format!("investimento {district} {year}"),
        format!("financiamento {district} {year}"),
        format!("transferências {district} {year}"),
    ]
}
