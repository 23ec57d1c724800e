//! Prompts for the analytics assistant

/// Tables the assistant may query. Mirrors the migrations.
pub const SCHEMA_DESCRIPTION: &str = r#"
orphanages(id uuid, name text, province text, city text, address text,
  contact_person text, phone text, email text, description text,
  capacity integer, legal_status text ['pending','verified','rejected'],
  documents jsonb, created_at timestamptz, updated_at timestamptz)

children(id uuid, orphanage_id uuid -> orphanages.id, first_name text,
  last_name text, gender text ['M','F'], birth_date date, estimated_age integer,
  entry_date date, parent_status text ['total_orphan','partial_orphan','abandoned'],
  internal_code text, created_at timestamptz)

health_records(id uuid, child_id uuid -> children.id, date date,
  vaccination_status text ['up_to_date','incomplete','not_vaccinated','unknown'],
  chronic_conditions text, medications text, remarks text, created_at timestamptz)

child_diseases(id uuid, child_id uuid -> children.id,
  health_record_id uuid -> health_records.id, disease_name text,
  diagnosed_date date, severity text ['mild','moderate','severe'], notes text)

nutrition_records(id uuid, child_id uuid -> children.id, date date,
  weight_kg double precision, height_cm double precision, bmi double precision,
  nutrition_status text ['normal','moderate_malnutrition','severe_malnutrition','overweight'],
  notes text)
"#;

pub fn sql_system_prompt() -> String {
    format!(
        r#"Tu es un analyste de données pour un registre de centres d'accueil d'enfants en RDC.
Traduis la question de l'utilisateur en UNE SEULE requête PostgreSQL.

Règles :
- Uniquement SELECT (ou WITH ... SELECT). Jamais de modification de données.
- Une seule instruction, sans point-virgule final.
- N'utilise que les tables et colonnes ci-dessous.
- Ajoute LIMIT 200 si le résultat peut être long.
- Réponds uniquement avec la requête SQL, sans explication.

Schéma :
{}"#,
        SCHEMA_DESCRIPTION
    )
}

pub const SUMMARY_SYSTEM_PROMPT: &str = r#"Tu es un assistant qui présente des statistiques à des administrateurs.
À partir de la question et des résultats JSON fournis, rédige une réponse courte et claire en français.
N'invente aucune donnée absente des résultats. Si les résultats sont vides, dis-le simplement."#;

pub fn summary_user_prompt(question: &str, sql: &str, rows: &serde_json::Value) -> String {
    format!(
        "Question : {}\n\nRequête exécutée :\n{}\n\nRésultats (JSON) :\n{}",
        question, sql, rows
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_prompt_lists_every_table() {
        let prompt = sql_system_prompt();
        for table in [
            "orphanages",
            "children",
            "health_records",
            "child_diseases",
            "nutrition_records",
        ] {
            assert!(prompt.contains(table), "missing {}", table);
        }
    }
}
