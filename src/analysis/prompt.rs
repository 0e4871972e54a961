//! Prompt text for the analysis service

use crate::models::{AnalysisContext, NormalizedMetrics};

/// Build the report prompt from normalized metrics and caller context
pub fn build_prompt(metrics: &NormalizedMetrics, context: &AnalysisContext) -> String {
    format!(
        "Analyze the following internet speed test results and write a helpful report.\n\
         \n\
         VERY IMPORTANT RULE: Answer using plain HTML only, suitable for insertion into an HTML block (div). \
         Use paragraph tags (<p>), line breaks (<br>) and bold text (<b>) for emphasis. \
         Do not use Markdown (no **, # or other formatting characters).\n\
         \n\
         1. Decide whether this speed suits the context given by the user.\n\
         2. Give two or three concrete recommendations for improving or optimizing the connection \
         based on the indicators (especially Ping and Download).\n\
         3. If the speed is very low, suggest a message the user can send to their internet service provider.\n\
         \n\
         Data:\n\
         - Download speed: {}\n\
         - Upload speed: {}\n\
         - Ping: {}\n\
         - User context: {}\n",
        metrics.download, metrics.upload, metrics.ping, context
    )
}
