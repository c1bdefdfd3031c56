use std::fmt;

/// Instruction text sent ahead of every question, derived from the store schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaPrompt {
    table_name: String,
    columns: Vec<String>,
    text: String,
}

impl SchemaPrompt {
    pub fn for_table<S: AsRef<str>>(table_name: &str, columns: &[S]) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        let text = format!(
            "You are an expert in converting English questions to SQL query!\n\
             The SQL database has the name '{table}' and has the following columns - {cols}\n\
             \n\
             For example,\n\
             - How many entries of records are present? (SQL command: SELECT COUNT(*) FROM {table};)\n\
             - Make a graph between price and sqft_living (SQL command: SELECT price, sqft_living FROM {table};)\n\
             \n\
             Note: The SQL code should not have triple backticks in the beginning or end, \
             and the output should not contain the word 'sql'.",
            table = table_name,
            cols = columns.join(", "),
        );

        Self {
            table_name: table_name.to_string(),
            columns,
            text,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for SchemaPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
