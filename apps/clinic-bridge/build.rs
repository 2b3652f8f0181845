fn main() {
    // Gera built.rs com versão e metadados de compilação
    built::write_built_file().expect("Falha ao coletar informações de compilação");
}
