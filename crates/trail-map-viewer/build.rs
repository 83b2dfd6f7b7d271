fn main() {
    // Build metadata (version, commit, build time) logged at startup
    shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");
}
