//! RAG demo over a built-in document, no video required.

use crate::chunking::TextSplitter;
use crate::cli::Output;
use crate::config::{DocumentPrompts, Settings};
use crate::embedding::OpenAIEmbedder;
use crate::error::Result;
use crate::llm::OpenAIChatModel;
use crate::pipeline::RagPipeline;
use console::style;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Sample document queried by the demo: an internal lab calibration procedure.
const SAMPLE_DOCUMENT: &str = r#"
Calibration Process - Internal Lab Document

1. Tool Registration:
Every tool entering the calibration lab is registered in the system and assigned
a unique routing card. The card includes tool type, manufacturer, serial number,
previous calibration date, and owner department.

2. Visual Inspection:
Before any measurement, the technician performs a visual inspection to check
for physical damage, wear, contamination, or missing parts. Tools that fail visual
inspection are returned to the customer without calibration.

3. Pre-Calibration Measurement:
Tools are measured against reference standards before adjustments. These standards
are traceable to national or international measurement institutes. All raw
data is recorded for traceability.

4. Adjustment (If Required):
If the pre-calibration results exceed acceptable limits, the tool is adjusted.
Adjustment steps are documented, including parts replaced or settings modified.

5. Post-Calibration Measurement:
Another measurement round is performed after adjustment to verify accuracy.
Measurements must fall within tolerance ranges defined in the tool's calibration
procedure.

6. Certificate Generation:
A calibration certificate is automatically generated, containing:
- Tool identification details
- Environmental conditions
- Measurement results (before & after)
- Uncertainty calculations
- Technician ID and approval signature

7. Archiving & Delivery:
Certificates and raw measurement data are archived in the lab database.
The tool and certificate are delivered back to the customer.
"#;

/// Chunk sizing for the short demo document.
const DEMO_CHUNK_SIZE: usize = 400;
const DEMO_CHUNK_OVERLAP: usize = 50;

/// Run the demo question loop over the built-in document.
pub async fn run_demo(settings: Settings) -> Result<()> {
    let prompts = DocumentPrompts::default();
    let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
    let model = Arc::new(OpenAIChatModel::new(&settings.rag.model)?);

    let spinner = Output::spinner("Indexing the sample document...");
    let pipeline = RagPipeline::build(
        SAMPLE_DOCUMENT,
        &TextSplitter::new(DEMO_CHUNK_SIZE, DEMO_CHUNK_OVERLAP),
        embedder,
        model,
        &prompts.system,
        &prompts.user,
        settings.rag.top_k,
    )
    .await;
    spinner.finish_and_clear();

    let pipeline = pipeline?;

    println!("\n{}", style("RAG Chat").bold().cyan());
    println!(
        "{}\n",
        style("Ask anything about the calibration document. Type 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let question = input.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        match pipeline.query(question).await {
            Ok(answer) => println!("\n{} {}\n", style("AI:").cyan().bold(), answer),
            Err(e) => Output::error(&format!("{}", e)),
        }
    }

    Ok(())
}
