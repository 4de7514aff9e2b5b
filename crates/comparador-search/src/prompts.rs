//! Prompt text sent to the generative text service.

use comparador_core::Store;
use comparador_llm::Prompt;

const SEARCH_SYSTEM: &str = "Eres un asistente que conoce el catálogo de tiendas de \
electrodomésticos y tecnología de Costa Rica. Responde siempre con un arreglo JSON válido \
y nada más.";

const SUMMARY_SYSTEM: &str =
    "You are a helpful assistant that simulates batch file processing for product comparison.";

const COMPARISON_SYSTEM: &str = "You are a helpful assistant that generates realistic product \
comparison data for Costa Rican stores. Always return valid JSON arrays.";

const SUMMARY_MAX_TOKENS: u32 = 500;
const COMPARISON_MAX_TOKENS: u32 = 3000;

/// Listing request for one store and term.
#[must_use]
pub fn store_search(store: Store, term: &str) -> Prompt {
    let user = format!(
        "Busca \"{term}\" en la tienda {name} ({site}).\n\
         Devuelve entre 3 y 5 productos como un arreglo JSON de objetos con las claves \
         \"name\", \"regular_price\", \"promo_price\", \"url\" e \"image_url\".\n\
         - Los precios van en colones con el formato \"₡1.250.000\".\n\
         - Si no hay promoción usa \"promo_price\": \"Sin precio promocional\".\n\
         - Los enlaces deben pertenecer a {site}.\n\
         Return only the JSON array, without commentary.",
        name = store.display_name(),
        site = store.homepage(),
    );
    Prompt::new(SEARCH_SYSTEM, user)
}

/// Summary of a batch upload, answered as a JSON object.
#[must_use]
pub fn batch_summary(file_name: &str) -> Prompt {
    let user = format!(
        "Simulate processing a batch file named \"{file_name}\" for product comparison.\n\
         Generate a realistic summary of what would happen:\n\
         - Number of products processed\n\
         - Processing time\n\
         - Any errors encountered\n\
         - Summary of findings\n\n\
         Return as JSON with format:\n\
         {{\n  \"productsProcessed\": 50,\n  \"processingTime\": \"2.5 minutes\",\n  \
         \"errors\": 2,\n  \"summary\": \"Processed 50 products from 3 stores with price comparisons\"\n}}"
    );
    Prompt::new(SUMMARY_SYSTEM, user).with_max_tokens(SUMMARY_MAX_TOKENS)
}

/// Rows of the comparison workbook, answered as a JSON array.
#[must_use]
pub fn comparison_rows() -> Prompt {
    let user = "Generate realistic product comparison data for a batch processing job.\n\
        Create 10-15 products with comparisons across Gollo, Monge, and MExpress stores in Costa Rica.\n\n\
        For each product, include:\n\
        - Product name\n\
        - Gollo price (regular and promo)\n\
        - Monge price (regular and promo)\n\
        - MExpress price (regular and promo)\n\
        - Best price and store\n\
        - URL to best price\n\n\
        Return as JSON array with this structure:\n\
        [\n  {\n    \"Producto\": \"Samsung Galaxy S25 Ultra 256GB\",\n    \
        \"Gollo Regular\": \"₡1.250.000\",\n    \"Gollo Promo\": \"₡1.150.000\",\n    \
        \"Monge Regular\": \"₡1.280.000\",\n    \"Monge Promo\": \"₡1.200.000\",\n    \
        \"MExpress Regular\": \"₡1.240.000\",\n    \"MExpress Promo\": \"₡1.180.000\",\n    \
        \"Mejor Precio\": \"₡1.150.000\",\n    \"Tienda Mejor Precio\": \"Gollo\",\n    \
        \"URL\": \"https://www.gollo.cr/samsung-s25-ultra\"\n  }\n]";
    Prompt::new(COMPARISON_SYSTEM, user).with_max_tokens(COMPARISON_MAX_TOKENS)
}
